use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";

/// Generates an alphanumeric secret, used for session signing keys and
/// cron secrets when none are configured.
pub fn create_random_secret(secret_len: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..secret_len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Compares two secrets without short circuiting on the first mismatch
pub fn secrets_match(given: &str, expected: &str) -> bool {
    let given = given.as_bytes();
    let expected = expected.as_bytes();
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_random_secret() {
        let sec1 = create_random_secret(32);
        let sec2 = create_random_secret(32);
        assert_eq!(sec1.len(), 32);
        assert_ne!(sec2, sec1);
        assert!(sec1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn it_compares_secrets() {
        assert!(secrets_match("cron-secret", "cron-secret"));
        assert!(!secrets_match("cron-secret", "cron-secreT"));
        assert!(!secrets_match("cron", "cron-secret"));
        assert!(!secrets_match("", "cron-secret"));
    }
}
