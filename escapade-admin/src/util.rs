use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric text, used for generated secrets
pub fn random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
