//! Browser and OS detection for platform-specific behavior.
//!
//! The reconciler needs two facts from here: which modifier carries the
//! "mod" chord (macOS vs. the rest) and whether the engine is Gecko, whose
//! focus handling for nested editables needs correcting.

/// Detected platform facts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Platform {
    pub mac: bool,
    pub ios: bool,
    pub android: bool,
    pub chrome: bool,
    pub safari: bool,
    pub gecko: bool,
    pub mobile: bool,
}

/// Detect the current platform from the window's user agent.
pub fn platform() -> Platform {
    let ua = web_sys::window()
        .map(|w| w.navigator().user_agent().unwrap_or_default())
        .unwrap_or_default();
    detect(&ua)
}

/// Classify a user-agent string.
pub fn detect(ua: &str) -> Platform {
    let chrome = ua.contains("Chrome/");
    let ios = ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod");
    let android = ua.contains("Android");
    Platform {
        mac: ua.contains("Macintosh"),
        ios,
        android,
        chrome,
        safari: ua.contains("Safari/") && !chrome,
        gecko: ua.contains("Gecko/"),
        mobile: android || ios || ua.contains("Mobile"),
    }
}
