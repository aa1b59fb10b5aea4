//! Tests for persona-core: steps, write-once records, results, errors

use persona_core::*;

// ===========================================================================
// Step
// ===========================================================================

#[test]
fn steps_are_numbered_one_to_eight_in_order() {
    let numbers: Vec<u8> = Step::ALL.iter().map(|s| s.number()).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<u8>>());
    assert_eq!(Step::ALL.len(), usize::from(Step::COUNT));
}

#[test]
fn step_from_number_and_next() {
    assert_eq!(Step::from_number(1), Some(Step::LoadIdentity));
    assert_eq!(Step::from_number(8), Some(Step::DeclareComplete));
    assert_eq!(Step::from_number(0), None);
    assert_eq!(Step::from_number(9), None);
    assert_eq!(Step::LoadEmotions.next(), Some(Step::IntegrityCheck));
    assert_eq!(Step::DeclareComplete.next(), None);
}

#[test]
fn step_display_is_position_of_total() {
    assert_eq!(Step::LoadMemory.to_string(), "3/8");
    assert_eq!(Step::DeclareComplete.to_string(), "8/8");
}

// ===========================================================================
// Record
// ===========================================================================

#[test]
fn record_insert_new_refuses_existing_key() {
    let mut id = Identity::new();
    id.insert_new("name", "Rafael".to_string()).unwrap();
    let err = id.insert_new("name", "Impostor".to_string()).unwrap_err();
    assert_eq!(err, "name");
    assert_eq!(id.get("name").map(String::as_str), Some("Rafael"));
    assert_eq!(id.len(), 1);
}

#[test]
fn record_serializes_as_plain_map() {
    let mut emotions = EmotionalState::new();
    emotions.insert_new("joy", 0.7).unwrap();
    assert_eq!(serde_json::to_string(&emotions).unwrap(), r#"{"joy":0.7}"#);
}

// ===========================================================================
// Memory
// ===========================================================================

#[test]
fn memory_accessors_pick_the_right_shape() {
    let mut memory = Memory::new();
    memory
        .insert_new(memory_keys::MASTER, MemoryValue::Text("blob".into()))
        .unwrap();
    memory
        .insert_new(
            memory_keys::ALL_FILES,
            MemoryValue::Files(vec!["IDENTITY.txt".into()]),
        )
        .unwrap();

    assert_eq!(memory.master(), Some("blob"));
    assert_eq!(memory.all_files(), Some(&["IDENTITY.txt".to_string()][..]));
    assert!(memory.security().is_none());
    assert!(memory.compressed().is_none());
}

#[test]
fn memory_value_emptiness() {
    assert!(MemoryValue::Text(String::new()).is_empty());
    assert!(MemoryValue::Files(vec![]).is_empty());
    assert!(MemoryValue::Structured(serde_json::Map::new()).is_empty());
    assert!(!MemoryValue::Text("x".into()).is_empty());
}

#[test]
fn memory_value_json_shapes() {
    let text = serde_json::to_value(MemoryValue::Text("a".into())).unwrap();
    assert_eq!(text, serde_json::json!("a"));
    let files: MemoryValue = serde_json::from_str(r#"["a.txt","b.dat"]"#).unwrap();
    assert_eq!(files.as_files().map(|f| f.len()), Some(2));
    let record: MemoryValue = serde_json::from_str(r#"{"k": 1}"#).unwrap();
    assert!(record.as_structured().is_some());
}

// ===========================================================================
// Secret
// ===========================================================================

#[test]
fn secret_debug_is_redacted() {
    let secret = Secret::new("hunter2");
    assert_eq!(format!("{:?}", secret), "Secret(***)");
    assert_eq!(format!("{:?}", Some(secret.clone())), "Some(Secret(***))");
    assert_eq!(secret.expose(), "hunter2");
}

// ===========================================================================
// ProtocolResult
// ===========================================================================

#[test]
fn success_reports_eight_steps_and_exit_zero() {
    let result = ProtocolResult::Success(PersonaState::default());
    assert!(result.is_success());
    assert_eq!(result.steps_completed(), 8);
    assert_eq!(result.exit_code(), 0);
    assert!(result.error().is_none());
}

#[test]
fn failure_carries_count_step_and_error() {
    let result = ProtocolResult::Failure {
        steps_completed: 2,
        step: Step::LoadMemory,
        error: BootError::malformed("memory_compressed.bin", "bad gzip"),
    };
    assert!(!result.is_success());
    assert_eq!(result.steps_completed(), 2);
    assert_eq!(result.exit_code(), 1);
    assert!(result.state().is_none());
    assert_eq!(result.error().map(BootError::kind), Some("malformed_data"));
}

#[test]
fn failure_json_shape() {
    let result = ProtocolResult::Failure {
        steps_completed: 0,
        step: Step::LoadIdentity,
        error: BootError::missing_file("IDENTITY.txt"),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["steps_completed"], 0);
    assert_eq!(json["step"], "load_identity");
    assert_eq!(json["error"]["kind"], "missing_file");
    assert_eq!(json["error"]["file"], "IDENTITY.txt");
}

#[test]
fn success_json_roundtrip() {
    let mut state = PersonaState::default();
    state.identity.insert_new("name", "Rafael".to_string()).unwrap();
    state
        .memory
        .insert_new(memory_keys::MASTER, MemoryValue::Text("m".into()))
        .unwrap();
    state.emotional_state.insert_new("hope", 0.8).unwrap();
    let result = ProtocolResult::Success(state);

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains(r#""status":"success""#));
    assert!(!json.contains("warnings"));
    let back: ProtocolResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

// ===========================================================================
// BootError
// ===========================================================================

#[test]
fn error_messages() {
    assert_eq!(
        BootError::missing_file("IDENTITY.txt").to_string(),
        "required file missing: IDENTITY.txt"
    );
    assert_eq!(
        BootError::permission_denied(Access::Write, "data").to_string(),
        "cannot write data"
    );
    assert_eq!(
        BootError::IntegrityError {
            missing: vec!["identity.name".into(), "memory.master".into()]
        }
        .to_string(),
        "critical data missing: identity.name, memory.master"
    );
    assert_eq!(
        BootError::IncompleteSequence {
            step: 8,
            completed: 5
        }
        .to_string(),
        "cannot run step 8: 5 steps completed, 7 required"
    );
}

#[test]
fn io_errors_map_onto_the_taxonomy() {
    use std::io::{Error, ErrorKind};
    assert_eq!(
        BootError::from_io("a.txt", &Error::from(ErrorKind::NotFound)),
        BootError::missing_file("a.txt")
    );
    assert_eq!(
        BootError::from_io("a.txt", &Error::from(ErrorKind::PermissionDenied)).kind(),
        "permission_denied"
    );
    assert_eq!(
        BootError::from_io("a.txt", &Error::new(ErrorKind::Other, "disk on fire")).kind(),
        "io"
    );
}
