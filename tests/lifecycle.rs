//! End-to-end lifecycle of a JSON-defined machine.

use serde_json::json;
use std::sync::{Arc, Mutex};
use stepwise::{
    BoxError, Callbacks, Context, Instance, InstanceError, MachineDefinition, Next, StateMachine,
    StepResult,
};

const DEFINITION: &str = r#"{
    "name": "StateMachine",
    "states": [
        {"start": true, "name": "Start"},
        {"end": true, "name": "End"},
        {"name": "Welcome"},
        {"name": "Wait data"},
        {"name": "Send data"}
    ],
    "transitions": [
        {"from": "Start", "to": "Welcome"},
        {"from": "Welcome", "to": "Wait data"},
        {"from": "Wait data", "to": "Send data"},
        {"from": "Send data", "to": "End"}
    ]
}"#;

const START: &str = "Start";
const END: &str = "End";
const WELCOME: &str = "Welcome";
const WAIT_DATA: &str = "Wait data";
const SEND_DATA: &str = "Send data";

type Events = Arc<Mutex<Vec<String>>>;

fn on_enter(events: &Events) -> impl Fn(&StateMachine, &Instance) -> Result<(), BoxError> {
    let events = Arc::clone(events);
    move |machine, instance| {
        events.lock().unwrap().push(format!(
            "{} {} enter {}",
            machine.name(),
            instance.id(),
            instance.current_state()
        ));
        Ok(())
    }
}

fn machine(wait_data_next: &'static str, events: &Events) -> StateMachine {
    let mut definition = MachineDefinition::from_json(DEFINITION).unwrap();
    let executed = Arc::clone(events);

    let callbacks = Callbacks::new()
        .transition(START, |_, _| Ok(Next::to(WELCOME)))
        .transition(WELCOME, |_, _| Ok(Next::to(WAIT_DATA)))
        .transition(WAIT_DATA, move |_, _| Ok(Next::from(wait_data_next)))
        .transition(SEND_DATA, |_, _| Ok(Next::to(END)))
        .on_enter(START, on_enter(events))
        .on_enter(WELCOME, on_enter(events))
        .on_enter(WAIT_DATA, on_enter(events))
        .on_enter(SEND_DATA, on_enter(events))
        .on_executed(move |machine, instance, old_state| {
            executed.lock().unwrap().push(format!(
                "{} {} executed {} -> {}",
                machine.name(),
                instance.id(),
                old_state.unwrap_or(""),
                instance.current_state()
            ));
            Ok(())
        });

    definition.initialize(callbacks).unwrap()
}

#[test]
fn create_state_machine_and_execute_instance() {
    let events = Events::default();
    let machine = machine(SEND_DATA, &events);
    let mut instance = machine.new_instance("12341234".to_string());
    assert_eq!(instance.current_state(), START);
    assert!(instance.is_start());

    for expected in [WELCOME, WAIT_DATA, SEND_DATA, END] {
        instance.execute().unwrap();
        assert_eq!(instance.current_state(), expected);
    }
    assert!(instance.is_end());

    let result = instance.execute();
    assert!(matches!(result, Err(InstanceError::EndState { .. })));
    assert_eq!(instance.current_state(), END);

    assert_eq!(
        instance.history().get_path(),
        vec![START, WELCOME, WAIT_DATA, SEND_DATA, END]
    );
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 7);
    assert_eq!(events[0], "StateMachine 12341234 executed Start -> Welcome");
    assert_eq!(events[1], "StateMachine 12341234 enter Welcome");
    assert_eq!(events[6], "StateMachine 12341234 executed Send data -> End");
}

#[test]
fn empty_transition_keeps_instance_in_place() {
    let events = Events::default();
    let machine = machine("", &events);
    let mut context = Context::new();
    context.insert("attempts".to_string(), json!(0));

    let mut instance = machine
        .load_instance("12341234".to_string(), Some(context), WAIT_DATA)
        .unwrap();
    assert_eq!(instance.current_state(), WAIT_DATA);

    let step = instance.execute().unwrap();

    assert_eq!(
        step,
        StepResult::Stayed {
            state: WAIT_DATA.to_string()
        }
    );
    assert_eq!(instance.current_state(), WAIT_DATA);
    assert!(!instance.is_end());
    assert_eq!(
        *events.lock().unwrap(),
        vec!["StateMachine 12341234 executed  -> Wait data"]
    );
}

#[test]
fn load_and_execute_instance() {
    let events = Events::default();
    let machine = machine(SEND_DATA, &events);

    let mut instance = machine
        .load_instance("12341234".to_string(), None, SEND_DATA)
        .unwrap();
    assert_eq!(instance.current_state(), SEND_DATA);

    instance.execute().unwrap();

    assert!(instance.is_end());
}

#[test]
fn context_survives_execution_and_returns_to_caller() {
    let events = Events::default();
    let machine = machine(SEND_DATA, &events);
    let mut context = Context::new();
    context.insert("payload".to_string(), json!("hello"));

    let mut instance = machine
        .load_instance("12341234".to_string(), Some(context), WAIT_DATA)
        .unwrap();
    instance.set_data("sent", true);
    instance.execute().unwrap();

    let context = instance.into_context();
    assert_eq!(context.get("payload"), Some(&json!("hello")));
    assert_eq!(context.get("sent"), Some(&json!(true)));
}

#[test]
fn machine_is_shared_across_threads() {
    let events = Events::default();
    let machine = machine(SEND_DATA, &events);

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let machine = machine.clone();
            std::thread::spawn(move || {
                let mut instance = machine.new_instance(format!("worker-{n}"));
                while !instance.is_end() {
                    instance.execute().unwrap();
                }
                instance.history().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 4);
    }
    // 4 executed + 3 enter events per instance
    assert_eq!(events.lock().unwrap().len(), 4 * 7);
}
