//! Version of the embedded runtime, fixed at compile time.

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

const fn parse_component(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

pub const VERSION_MAJOR: u32 = parse_component(env!("CARGO_PKG_VERSION_MAJOR"));
pub const VERSION_MINOR: u32 = parse_component(env!("CARGO_PKG_VERSION_MINOR"));
pub const VERSION_PATCH: u32 = parse_component(env!("CARGO_PKG_VERSION_PATCH"));

pub fn version_major() -> u32 {
    VERSION_MAJOR
}

pub fn version_minor() -> u32 {
    VERSION_MINOR
}

pub fn version_patch() -> u32 {
    VERSION_PATCH
}

/// `true` unless the version carries a pre-release tag.
pub fn version_is_release() -> bool {
    env!("CARGO_PKG_VERSION_PRE").is_empty()
}

pub fn version_string() -> &'static str {
    VERSION_STRING
}

pub fn is_debug_build() -> bool {
    cfg!(debug_assertions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_match_version_string() {
        let expected = format!("{}.{}.{}", version_major(), version_minor(), version_patch());
        assert!(version_string().starts_with(&expected));
    }

    #[test]
    fn release_flag_follows_pre_release_tag() {
        assert_eq!(version_is_release(), !version_string().contains('-'));
    }

    #[test]
    fn parses_multi_digit_components() {
        assert_eq!(parse_component("0"), 0);
        assert_eq!(parse_component("17"), 17);
        assert_eq!(parse_component("204"), 204);
    }
}
