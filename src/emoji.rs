use std::collections::HashMap;

use crate::config::{Config, EmojiConfig};
use crate::rank::rank_by;

/// Built-in shortcode table. Order is the tie-break order for search.
static EMOJI: &[(&str, &str)] = &[
    ("thumbsup", "👍"),
    ("+1", "👍"),
    ("thumbsdown", "👎"),
    ("-1", "👎"),
    ("heart", "❤️"),
    ("joy", "😂"),
    ("fire", "🔥"),
    ("fire_engine", "🚒"),
    ("firecracker", "🧨"),
    ("tada", "🎉"),
    ("eyes", "👀"),
    ("pray", "🙏"),
    ("white_check_mark", "✅"),
    ("heavy_check_mark", "✔️"),
    ("x", "❌"),
    ("rocket", "🚀"),
    ("100", "💯"),
    ("smile", "😄"),
    ("smiley", "😃"),
    ("grinning", "😀"),
    ("grin", "😁"),
    ("laughing", "😆"),
    ("sweat_smile", "😅"),
    ("rofl", "🤣"),
    ("slightly_smiling_face", "🙂"),
    ("upside_down_face", "🙃"),
    ("wink", "😉"),
    ("blush", "😊"),
    ("innocent", "😇"),
    ("smiling_face_with_three_hearts", "🥰"),
    ("heart_eyes", "😍"),
    ("star_struck", "🤩"),
    ("kissing_heart", "😘"),
    ("yum", "😋"),
    ("stuck_out_tongue", "😛"),
    ("stuck_out_tongue_winking_eye", "😜"),
    ("zany_face", "🤪"),
    ("money_mouth_face", "🤑"),
    ("hugging_face", "🤗"),
    ("thinking_face", "🤔"),
    ("shushing_face", "🤫"),
    ("zipper_mouth_face", "🤐"),
    ("raised_eyebrow", "🤨"),
    ("neutral_face", "😐"),
    ("expressionless", "😑"),
    ("no_mouth", "😶"),
    ("smirk", "😏"),
    ("unamused", "😒"),
    ("roll_eyes", "🙄"),
    ("grimacing", "😬"),
    ("relieved", "😌"),
    ("pensive", "😔"),
    ("sleepy", "😪"),
    ("sleeping", "😴"),
    ("mask", "😷"),
    ("face_with_thermometer", "🤒"),
    ("nauseated_face", "🤢"),
    ("sneezing_face", "🤧"),
    ("hot_face", "🥵"),
    ("cold_face", "🥶"),
    ("dizzy_face", "😵"),
    ("exploding_head", "🤯"),
    ("cowboy_hat_face", "🤠"),
    ("partying_face", "🥳"),
    ("sunglasses", "😎"),
    ("nerd_face", "🤓"),
    ("confused", "😕"),
    ("worried", "😟"),
    ("open_mouth", "😮"),
    ("astonished", "😲"),
    ("flushed", "😳"),
    ("pleading_face", "🥺"),
    ("cry", "😢"),
    ("sob", "😭"),
    ("scream", "😱"),
    ("disappointed", "😞"),
    ("sweat", "😓"),
    ("weary", "😩"),
    ("tired_face", "😫"),
    ("yawning_face", "🥱"),
    ("triumph", "😤"),
    ("rage", "😡"),
    ("angry", "😠"),
    ("skull", "💀"),
    ("poop", "💩"),
    ("clown_face", "🤡"),
    ("ghost", "👻"),
    ("alien", "👽"),
    ("robot_face", "🤖"),
    ("see_no_evil", "🙈"),
    ("hear_no_evil", "🙉"),
    ("speak_no_evil", "🙊"),
    ("wave", "👋"),
    ("raised_hand", "✋"),
    ("ok_hand", "👌"),
    ("pinched_fingers", "🤌"),
    ("v", "✌️"),
    ("crossed_fingers", "🤞"),
    ("point_up", "☝️"),
    ("point_down", "👇"),
    ("point_left", "👈"),
    ("point_right", "👉"),
    ("clap", "👏"),
    ("raised_hands", "🙌"),
    ("open_hands", "👐"),
    ("handshake", "🤝"),
    ("muscle", "💪"),
    ("brain", "🧠"),
    ("tooth", "🦷"),
    ("mouth", "👄"),
    ("broken_heart", "💔"),
    ("sparkling_heart", "💖"),
    ("blue_heart", "💙"),
    ("green_heart", "💚"),
    ("yellow_heart", "💛"),
    ("purple_heart", "💜"),
    ("black_heart", "🖤"),
    ("sparkles", "✨"),
    ("star", "⭐"),
    ("zap", "⚡"),
    ("boom", "💥"),
    ("dizzy", "💫"),
    ("speech_balloon", "💬"),
    ("thought_balloon", "💭"),
    ("zzz", "💤"),
    ("warning", "⚠️"),
    ("no_entry", "⛔"),
    ("question", "❓"),
    ("exclamation", "❗"),
    ("bulb", "💡"),
    ("memo", "📝"),
    ("pushpin", "📌"),
    ("paperclip", "📎"),
    ("calendar", "📆"),
    ("chart_with_upwards_trend", "📈"),
    ("chart_with_downwards_trend", "📉"),
    ("bar_chart", "📊"),
    ("lock", "🔒"),
    ("unlock", "🔓"),
    ("key", "🔑"),
    ("hammer", "🔨"),
    ("wrench", "🔧"),
    ("gear", "⚙️"),
    ("link", "🔗"),
    ("mag", "🔍"),
    ("bell", "🔔"),
    ("mega", "📣"),
    ("package", "📦"),
    ("email", "📧"),
    ("computer", "💻"),
    ("keyboard", "⌨️"),
    ("bug", "🐛"),
    ("stethoscope", "🩺"),
    ("hourglass", "⌛"),
    ("stopwatch", "⏱️"),
    ("alarm_clock", "⏰"),
    ("coffee", "☕"),
    ("tea", "🍵"),
    ("beer", "🍺"),
    ("beers", "🍻"),
    ("champagne", "🍾"),
    ("pizza", "🍕"),
    ("hamburger", "🍔"),
    ("taco", "🌮"),
    ("cake", "🍰"),
    ("birthday", "🎂"),
    ("cookie", "🍪"),
    ("doughnut", "🍩"),
    ("apple", "🍎"),
    ("avocado", "🥑"),
    ("balloon", "🎈"),
    ("gift", "🎁"),
    ("trophy", "🏆"),
    ("medal", "🏅"),
    ("dart", "🎯"),
    ("video_game", "🎮"),
    ("musical_note", "🎵"),
    ("art", "🎨"),
    ("sunny", "☀️"),
    ("cloud", "☁️"),
    ("umbrella", "☔"),
    ("snowflake", "❄️"),
    ("rainbow", "🌈"),
    ("earth_americas", "🌎"),
    ("earth_africa", "🌍"),
    ("ocean", "🌊"),
    ("seedling", "🌱"),
    ("evergreen_tree", "🌲"),
    ("cactus", "🌵"),
    ("sunflower", "🌻"),
    ("rose", "🌹"),
    ("dog", "🐶"),
    ("cat", "🐱"),
    ("mouse", "🐭"),
    ("fox_face", "🦊"),
    ("bear", "🐻"),
    ("panda_face", "🐼"),
    ("unicorn_face", "🦄"),
    ("crab", "🦀"),
    ("snake", "🐍"),
    ("turtle", "🐢"),
    ("octopus", "🐙"),
    ("bee", "🐝"),
    ("butterfly", "🦋"),
    ("car", "🚗"),
    ("airplane", "✈️"),
    ("ship", "🚢"),
    ("house", "🏠"),
    ("office", "🏢"),
    ("construction", "🚧"),
    ("checkered_flag", "🏁"),
    ("triangular_flag_on_post", "🚩"),
    ("white_flag", "🏳️"),
    ("arrow_up", "⬆️"),
    ("arrow_down", "⬇️"),
    ("arrow_left", "⬅️"),
    ("arrow_right", "➡️"),
    ("repeat", "🔁"),
    ("heavy_plus_sign", "➕"),
    ("heavy_minus_sign", "➖"),
    ("red_circle", "🔴"),
    ("large_blue_circle", "🔵"),
    ("white_circle", "⚪"),
    ("black_circle", "⚫"),
];

/// How a shortcode should be drawn at render time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiGlyph<'a> {
    Unicode(&'static str),
    Image(&'a str),
    /// No match anywhere; draw the `:shortcode:` text itself.
    Literal(String),
}

/// Whether `name` is a syntactically valid shortcode (the text between colons).
pub(crate) fn is_shortcode_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}

/// Look up the unicode form of a built-in shortcode.
///
/// Surrounding colons are tolerated, so `:fire:` and `fire` resolve alike.
pub fn resolve(shortcode: &str) -> Option<&'static str> {
    let name = shortcode.trim_matches(':');
    EMOJI
        .iter()
        .find(|(code, _)| *code == name)
        .map(|(_, unicode)| *unicode)
}

/// Resolve a shortcode for display, preferring the workspace's custom emoji.
pub fn render<'a>(shortcode: &str, custom: &'a HashMap<String, String>) -> EmojiGlyph<'a> {
    let name = shortcode.trim_matches(':');
    if let Some(url) = custom.get(name) {
        return EmojiGlyph::Image(url.as_str());
    }
    match resolve(name) {
        Some(unicode) => EmojiGlyph::Unicode(unicode),
        None => EmojiGlyph::Literal(format!(":{name}:")),
    }
}

/// Ranked shortcode search using the default config.
pub fn search(query: &str, limit: usize) -> Vec<&'static str> {
    search_with_config(query, limit, &Config::compiled_default().emoji)
}

/// Ranked shortcode search.
///
/// An empty query yields the configured common shortlist in its configured
/// order. Otherwise exact matches come first, then prefix matches, then
/// substring matches, each tier in table order.
pub fn search_with_config(query: &str, limit: usize, config: &EmojiConfig) -> Vec<&'static str> {
    let query = query.trim().trim_matches(':');
    let found: Vec<&'static str> = if query.is_empty() {
        config
            .common
            .iter()
            .filter_map(|name| EMOJI.iter().find(|(code, _)| *code == name.as_str()))
            .map(|(code, _)| *code)
            .collect()
    } else {
        rank_by(EMOJI.iter().map(|(code, _)| *code), query, |code| *code)
    };
    found.into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ranks_first() {
        let results = search("fire", 10);
        assert_eq!(results[0], "fire");
        assert_eq!(&results[1..3], &["fire_engine", "firecracker"]);
    }

    #[test]
    fn prefix_before_substring() {
        let results = search("th", 50);
        let thumbsup = results.iter().position(|c| *c == "thumbsup").unwrap();
        let birthday = results.iter().position(|c| *c == "birthday").unwrap();
        assert!(thumbsup < birthday);
        assert!(results[..4].iter().all(|c| c.starts_with("th")));
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search("xyznonexistent", 10).is_empty());
    }

    #[test]
    fn empty_query_returns_common_shortlist() {
        let config = EmojiConfig {
            common: vec!["tada".into(), "nope_not_real".into(), "eyes".into()],
            search_limit: 20,
        };
        assert_eq!(search_with_config("", 10, &config), vec!["tada", "eyes"]);
        assert_eq!(search_with_config("", 1, &config), vec!["tada"]);
    }

    #[test]
    fn search_is_case_insensitive_and_truncated() {
        assert_eq!(search("FIRE", 1), vec!["fire"]);
        assert_eq!(search(":rocket:", 5), vec!["rocket"]);
    }

    #[test]
    fn resolve_table_lookup() {
        assert_eq!(resolve("fire"), Some("🔥"));
        assert_eq!(resolve(":tada:"), Some("🎉"));
        assert_eq!(resolve("partyparrot"), None);
    }

    #[test]
    fn render_prefers_custom() {
        let mut custom = HashMap::new();
        custom.insert("fire".to_string(), "https://img.example/fire.png".to_string());
        custom.insert("partyparrot".to_string(), "https://img.example/pp.gif".to_string());
        assert_eq!(render("fire", &custom), EmojiGlyph::Image("https://img.example/fire.png"));
        assert_eq!(render(":partyparrot:", &custom), EmojiGlyph::Image("https://img.example/pp.gif"));
        assert_eq!(render("tada", &custom), EmojiGlyph::Unicode("🎉"));
        assert_eq!(render("nope", &custom), EmojiGlyph::Literal(":nope:".into()));
    }

    #[test]
    fn shortcode_names() {
        assert!(is_shortcode_name("+1"));
        assert!(is_shortcode_name("white_check_mark"));
        assert!(!is_shortcode_name(""));
        assert!(!is_shortcode_name("two words"));
    }
}
