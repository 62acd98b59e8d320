//! Integration tests for end-to-end Gatework execution.
//!
//! These tests verify the full pipeline:
//! Load registry → Instantiate → Simulate → Verify

use std::sync::Arc;

use gatework_runtime::{
    CircuitGate, Error, ErrorCategory, Gate, Position, Simulation, TemplateRegistry,
};
use gatework_tests::{TestHarness, default_registry};
use gatework_transforms::{TRANSFORMS, TransformDescriptor, TransformError, TransformImpl};
use gatework_types::{Interface, Value};
use linkme::distributed_slice;

fn majority(input: Option<&Value>) -> gatework_transforms::Result<Option<Value>> {
    let bits = input.ok_or(TransformError::MissingInput)?.leaves();
    let high = bits.iter().filter(|b| **b).count();
    Ok(Some(Value::bit(high * 2 > bits.len())))
}

#[distributed_slice(TRANSFORMS)]
static MAJORITY: TransformDescriptor = TransformDescriptor {
    name: "majority",
    doc: "High when most input bits are high",
    category: "logic",
    implementation: TransformImpl::Pure(majority),
};

fn registry_with(extra: &str) -> Arc<TemplateRegistry> {
    let mut registry = (*default_registry()).clone();
    registry.extend(TemplateRegistry::from_json(extra).unwrap());
    Arc::new(registry)
}

/// Half adder: sum is xor, carry is and.
#[test]
fn test_half_adder_truth_table() {
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut harness = TestHarness::new("half adder");
        harness.set_input(&format!("[{}, {}]", u8::from(a), u8::from(b)));
        harness.run_ticks(4);
        assert_eq!(harness.output_bits(), vec![a ^ b, a && b], "inputs {a} {b}");
    }
}

/// The boundary and the inner link each add one tick of delay.
#[test]
fn test_nand_circuit_truth_table() {
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut harness = TestHarness::new("nand circuit");
        harness.set_input(&format!("[{}, {}]", u8::from(a), u8::from(b)));
        harness.run_ticks(5);
        assert_eq!(harness.output_bits(), vec![!(a && b)], "inputs {a} {b}");
    }
}

#[test]
fn test_sr_latch_set_hold_reset() {
    let mut harness = TestHarness::new("sr latch");
    assert_eq!(
        harness.root().input().interface(),
        &"[s: bit, r: bit]".parse::<Interface>().unwrap()
    );

    harness.set_input("[1, 0]");
    harness.run_ticks(6);
    assert_eq!(harness.output_bits(), vec![true, false]);

    harness.set_input("[0, 0]");
    harness.run_ticks(6);
    assert_eq!(harness.output_bits(), vec![true, false]);

    harness.set_input("[0, 1]");
    harness.run_ticks(6);
    assert_eq!(harness.output_bits(), vec![false, true]);

    harness.set_input("[0, 0]");
    harness.run_ticks(6);
    assert_eq!(harness.output_bits(), vec![false, true]);
    assert_eq!(harness.current_tick(), 24);
}

#[test]
fn test_clock_and_switch() {
    let mut clock = TestHarness::new("clock");
    let mut seen = Vec::new();
    for _ in 0..4 {
        clock.tick();
        seen.extend(clock.output_bits());
    }
    assert_eq!(seen, vec![false, true, false, true]);

    let mut switch = TestHarness::new("switch");
    switch.tick();
    assert_eq!(switch.output_bits(), vec![false]);
    assert!(switch.root_mut().click());
    switch.run_ticks(2);
    assert_eq!(switch.output_bits(), vec![true]);
}

/// Circuits can contain circuits; `and` built from two nand circuits.
#[test]
fn test_nested_circuits() {
    let registry = registry_with(
        r#"{
            "and from nands": {
                "io": { "input": "<bit, 2>", "output": "bit" },
                "circuit": {
                    "gates": [
                        { "id": "first", "type": "nand circuit" },
                        { "id": "second", "type": "nand circuit" }
                    ],
                    "links": ["outside=>first", "first=>second/0", "first=>second/1", "second=>outside"]
                }
            }
        }"#,
    );
    for (a, b) in [(false, true), (true, true)] {
        let mut harness = TestHarness::with_registry(&registry, "and from nands");
        harness.set_input(&format!("[{}, {}]", u8::from(a), u8::from(b)));
        harness.run_ticks(12);
        assert_eq!(harness.output_bits(), vec![a && b]);
    }
}

#[test]
fn test_link_time_plugin_transform() {
    let registry = registry_with(
        r#"{ "majority": { "io": { "input": "<bit, 3>", "output": "bit" }, "transform": "majority" } }"#,
    );
    let mut harness = TestHarness::with_registry(&registry, "majority");
    harness.set_input("[1, 0, 1]");
    harness.tick();
    assert_eq!(harness.output_bits(), vec![true]);

    harness.set_input("[0, 0, 1]");
    harness.tick();
    assert_eq!(harness.output_bits(), vec![false]);
}

#[test]
fn test_runtime_native_transform() {
    let mut registry = (*default_registry()).clone();
    registry.register_native("always high", || {
        Box::new(|_: Option<&Value>| -> gatework_transforms::Result<Option<Value>> {
            Ok(Some(Value::high()))
        })
    });
    registry.extend(
        TemplateRegistry::from_json(
            r#"{ "stuck": { "io": { "input": "bit", "output": "bit" }, "transform": "always high" } }"#,
        )
        .unwrap(),
    );
    let mut harness = TestHarness::with_registry(&Arc::new(registry), "stuck");
    harness.run_ticks(2);
    assert_eq!(harness.output_bits(), vec![true]);
}

/// A gate whose transform is missing faults every tick without
/// stopping its siblings.
#[test]
fn test_fault_is_isolated_to_the_gate() {
    let registry = registry_with(
        r#"{
            "ghost": { "io": { "input": "bit", "output": "bit" }, "transform": "no such transform" },
            "haunted": {
                "io": { "input": "bit", "output": "[bit, bit]" },
                "circuit": {
                    "gates": [{ "id": "g", "type": "ghost" }, { "id": "n", "type": "not" }],
                    "links": ["outside=>g", "outside=>n", "g=>outside/0", "n=>outside/1"]
                }
            }
        }"#,
    );
    let mut harness = TestHarness::with_registry(&registry, "haunted");
    harness.set_input("0");
    harness.run_ticks(3);
    assert_eq!(harness.output_bits(), vec![false, true]);

    let circuit = harness.root().as_circuit().unwrap();
    let faults: Vec<_> = circuit
        .gates()
        .filter_map(|(_, gate)| gate.error())
        .collect();
    assert_eq!(faults.len(), 1);
    assert!(matches!(faults[0], Error::NotLoaded(_)));
    assert_eq!(faults[0].category(), ErrorCategory::Evaluation);
    assert!(harness.root().error().is_none());
}

#[test]
fn test_declared_io_must_agree_with_interior() {
    let registry = registry_with(
        r#"{
            "liar": {
                "io": { "input": "[bit, bit, bit]", "output": "bit" },
                "circuit": {
                    "gates": [{ "id": "0", "type": "and" }],
                    "links": ["outside=>0", "0=>outside"]
                }
            }
        }"#,
    );
    let err = Gate::from_template("liar", &registry).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

/// Serialize a circuit, load it into an empty one and compare behaviour.
#[test]
fn test_serialize_and_reload() {
    let registry = default_registry();
    let original = Gate::from_template("sr latch", &registry).unwrap();
    let json = original.as_circuit().unwrap().to_json().unwrap();

    let mut copy = Gate::circuit("sr latch copy", CircuitGate::with_templates(Arc::clone(&registry)));
    let ids = copy.insert_json(&json, Position::default()).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(
        copy.as_circuit().unwrap().serialize(),
        original.as_circuit().unwrap().serialize()
    );

    let mut simulation = Simulation::new(copy).unwrap();
    simulation.set_input(Value::bits([true, false])).unwrap();
    simulation.run(6);
    assert_eq!(simulation.output().unwrap().leaves(), vec![true, false]);
}

/// Copy a selection and paste it twice, shifted each time.
#[test]
fn test_paste_selection() {
    let registry = default_registry();
    let mut gate = Gate::circuit("scratch", CircuitGate::with_templates(Arc::clone(&registry)));
    let ids = gate
        .insert_json(
            r#"{
                "gates": [{ "id": "a", "type": "not" }, { "id": "b", "type": "not" }],
                "links": ["outside=>a", "a=>b", "b=>outside"]
            }"#,
            Position::default(),
        )
        .unwrap();
    assert_eq!(gate.input().interface(), &Interface::bit());

    let circuit = gate.as_circuit().unwrap();
    let clipboard = circuit
        .serialize_selection(&[ids["a"], ids["b"]])
        .to_json()
        .unwrap();
    assert!(!clipboard.contains("outside"));

    let pasted = gate.insert_json(&clipboard, Position::new(0.0, 100.0)).unwrap();
    let circuit = gate.as_circuit().unwrap();
    assert_eq!(circuit.gate_count(), 4);
    assert_eq!(circuit.links().len(), 4);
    assert_eq!(circuit.gate(pasted["0"]).unwrap().position, Position::new(0.0, 100.0));
}

/// Pasting a description with a bad link leaves the circuit untouched.
#[test]
fn test_failed_paste_rolls_back() {
    let registry = default_registry();
    let mut gate = Gate::circuit("scratch", CircuitGate::with_templates(registry));
    let err = gate
        .insert_json(
            r#"{
                "gates": [{ "id": "a", "type": "high" }, { "id": "b", "type": "not" }],
                "links": ["a=>b", "a=>b"]
            }"#,
            Position::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InputOccupied { .. }));
    let circuit = gate.as_circuit().unwrap();
    assert_eq!(circuit.gate_count(), 0);
    assert!(circuit.links().is_empty());

    let err = gate
        .insert_json(
            r#"{
                "gates": [{ "id": "a", "type": "not" }],
                "links": ["outside/3=>a", "a=>missing"]
            }"#,
            Position::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownGateId(_)));
    let circuit = gate.as_circuit().unwrap();
    assert_eq!(circuit.gate_count(), 0);
    assert!(circuit.inner_input().sub_ports().is_empty());
    assert!(circuit.inner_output().sub_ports().is_empty());

    gate.insert_json(
        r#"{ "gates": [{ "id": "a", "type": "not" }] }"#,
        Position::default(),
    )
    .unwrap();
    assert_eq!(gate.input().interface(), &Interface::none());
    assert_eq!(gate.output().interface(), &Interface::none());
}

#[test]
fn test_unknown_root_type() {
    let err = Gate::from_template("flux capacitor", &default_registry()).unwrap_err();
    assert!(matches!(err, Error::UnknownGateType(ref name) if name == "flux capacitor"));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}
