//! Default detection tables.
//!
//! Loaded once into `PrerenderConfig` at startup and never mutated.

/// User-agent substrings of search engines and link-preview fetchers.
pub const CRAWLER_USER_AGENTS: &[&str] = &[
    "baiduspider",
    "iaskspider",
    "sogou web spider",
    "sogou push spider",
    "yodaobot",
    "msnbot",
    "sosospider",
    "sosoimagespider",
    "yahoo! slurp",
    "360spider",
    "facebookexternalhit",
    "twitterbot",
    "rogerbot",
    "linkedinbot",
    "embedly",
    "quora link preview",
    "showyoubot",
    "outbrain",
    "pinterest",
    "slackbot",
    "vkShare",
    "W3C_Validator",
    "developers.google.com/+/web/snippet",
    "googlebot",
    "bingbot",
    "yandex",
    "duckduckbot",
    "applebot",
    "discordbot",
    "telegrambot",
    "whatsapp",
];

/// URL substrings marking static assets. The last four carry no leading dot.
pub const IGNORED_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".xml", ".less", ".png", ".jpg", ".jpeg", ".gif", ".pdf", ".doc", ".txt",
    ".ico", ".rss", ".zip", ".mp3", ".rar", ".exe", ".wmv", ".avi", ".ppt", ".mpg", ".mpeg",
    ".tif", ".wav", ".mov", ".psd", ".ai", ".xls", ".mp4", ".m4a", ".swf", ".dat", ".dmg",
    ".iso", ".flv", ".m4v", ".torrent", "ttf", "woff", "svg", "eot",
];

pub const REDIRECT_STATUS_CODES: &[u16] = &[301, 302];

pub const RENDER_TYPE: &str = "html";

pub const FORCE_RENDER_HEADER: &str = "x-bufferbot";

/// Identifies this filter to the rendering service inside the POST payload.
pub const RENDERER_USER_AGENT: &str = "Prerender (+https://github.com/prerender/prerender)";

pub fn crawler_user_agents() -> Vec<String> {
    CRAWLER_USER_AGENTS.iter().map(|s| s.to_string()).collect()
}

pub fn ignored_extensions() -> Vec<String> {
    IGNORED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}
