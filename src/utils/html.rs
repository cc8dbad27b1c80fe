// src/utils/html.rs

/// Sanitizes lesson HTML with ammonia's whitelist.
///
/// Safe formatting tags (<p>, <strong>, <code>) survive; <script>, <iframe>
/// and event-handler attributes are stripped along with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
