// Prompt constants for the search endpoints.
// Templates carry `{topic}`, `{count}` and `{exclusions}` placeholders.

/// System prompt for place search.
pub const PLACE_SEARCH_SYSTEM: &str = "You are a local guide who only suggests places \
    that really exist at the address you give. \
    Never invent a place; if you are unsure a place exists, leave it out. \
    Your reply is a JSON array of place objects.";

pub const PLACE_SEARCH_PROMPT_TEMPLATE: &str = r#"Suggest up to {count} real places matching this request:
"{topic}"

Do NOT suggest any of these places again:
{exclusions}

Return a JSON ARRAY:
[
  {
    "name": "Official name of the place",
    "description": "One or two sentences describing it",
    "reason": "Why it matches the request",
    "address": "Street address",
    "city": "City or town",
    "latitude": 48.8606,
    "longitude": 2.3376,
    "source": "https://official-website.example"
  }
]

RULES:
1. Every place must exist at the given address and city
2. "source" is optional; only give an official absolute URL you are sure of
3. Return fewer items rather than guessing"#;

/// System prompt for conceptual search.
pub const CONCEPT_SEARCH_SYSTEM: &str = "You are a research assistant that finds ideas, \
    works and references related to a theme. \
    Your reply is a JSON array of objects.";

pub const CONCEPT_SEARCH_PROMPT_TEMPLATE: &str = r#"Find up to {count} distinct concepts, works or references related to:
"{topic}"

Do NOT repeat any of these:
{exclusions}

Return a JSON ARRAY:
[
  {
    "title": "Short title",
    "description": "One or two sentences",
    "reason": "How it relates to the theme",
    "source": "https://reference.example/article"
  }
]

RULES:
1. Titles must be distinct from each other and from the excluded list
2. "source" is optional; only give an absolute URL you are sure of"#;
