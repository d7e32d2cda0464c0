//! Resource names.

use rand::Rng;

/// `<prefix>-<name>-<random digits>`. Either part may be empty, in which
/// case it is left out.
pub fn rand_name(prefix: &str, name: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..100_000_000);
    [prefix, name]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .chain(std::iter::once(suffix.to_string()))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_name_shape() {
        let name = rand_name("computest", "ServersAdminTest-server");
        let suffix = name
            .strip_prefix("computest-ServersAdminTest-server-")
            .unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_rand_name_skips_empty_parts() {
        let name = rand_name("", "server");
        assert!(name.starts_with("server-"));
    }

    #[test]
    fn test_rand_name_varies() {
        let names: std::collections::HashSet<_> =
            (0..20).map(|_| rand_name("p", "n")).collect();
        assert!(names.len() > 1);
    }
}
