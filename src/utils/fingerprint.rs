use sha2::{Digest, Sha256};

/// Length of the stored fingerprint, in hex characters.
pub const FINGERPRINT_LEN: usize = 32;

/// Client attributes the fingerprint is derived from.
#[derive(Debug, Default, Clone)]
pub struct ClientTraits<'a> {
    pub user_agent: &'a str,
    pub language: &'a str,
    pub screen: Option<(u32, u32)>,
}

/// Hash client traits into a scan fingerprint.
///
/// This is a deduplication heuristic only. Every input comes from the client and
/// is trivially spoofed; two people on identical devices collide.
pub fn fingerprint(traits: &ClientTraits<'_>, salt: &str) -> String {
    let (width, height) = traits.screen.unwrap_or((0, 0));
    let raw = format!(
        "{}{}{}{}{}",
        traits.user_agent, traits.language, width, height, salt
    );

    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let result = hasher.finalize();

    let mut hex = format!("{:x}", result);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits(user_agent: &str) -> ClientTraits<'_> {
        ClientTraits {
            user_agent,
            language: "en-US",
            screen: Some((390, 844)),
        }
    }

    #[test]
    fn stable_for_same_client() {
        let a = fingerprint(&traits("Mozilla/5.0"), "salt");
        let b = fingerprint(&traits("Mozilla/5.0"), "salt");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn differs_across_clients_and_salts() {
        let base = fingerprint(&traits("Mozilla/5.0"), "salt");
        assert_ne!(base, fingerprint(&traits("curl/8.0"), "salt"));
        assert_ne!(base, fingerprint(&traits("Mozilla/5.0"), "pepper"));

        let mut other_screen = traits("Mozilla/5.0");
        other_screen.screen = Some((1920, 1080));
        assert_ne!(base, fingerprint(&other_screen, "salt"));
    }
}
