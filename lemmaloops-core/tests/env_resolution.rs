use lemmaloops_core as llc;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

// Tests in this file share the process environment.
fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[test]
fn tamarin_from_env_or_path() {
    let _g = env_lock().lock().unwrap();

    std::env::set_var("TAMARIN_PROVER", "/opt/tamarin/bin/tamarin-prover");
    assert_eq!(
        llc::prover::resolve_tamarin(),
        PathBuf::from("/opt/tamarin/bin/tamarin-prover")
    );

    std::env::set_var("TAMARIN_PROVER", "   ");
    assert_eq!(llc::prover::resolve_tamarin(), PathBuf::from("tamarin-prover"));

    std::env::remove_var("TAMARIN_PROVER");
    assert_eq!(llc::prover::resolve_tamarin(), PathBuf::from("tamarin-prover"));
}

#[test]
fn m4_from_env_or_path() {
    let _g = env_lock().lock().unwrap();

    std::env::set_var("M4", " /usr/local/bin/gm4 ");
    assert_eq!(llc::rewrite::resolve_m4(), PathBuf::from("/usr/local/bin/gm4"));

    std::env::remove_var("M4");
    assert_eq!(llc::rewrite::resolve_m4(), PathBuf::from("m4"));
}
