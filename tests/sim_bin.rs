use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let fleet = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/fleet_8x8.json");
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .args([fleet, "2"])
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert!(v["best"].is_string());
    for agent in ["bruteforce", "optimal", "random"] {
        let moves = v[agent]["moves"].as_u64().expect("missing move count");
        assert!((11..=64).contains(&moves));
    }
}
