//! Built-in transforms.
//!
//! Kept in a plain static table rather than the distributed slice so the
//! linker cannot discard them from binaries that never name them.
//!
//! Multi-input logic transforms fold over every bit of their input, so
//! `and` works the same on `[bit, bit]`, `<bit, 8>` and a single `bit`.

use gatework_types::{Value, ValueKind};

use crate::{Result, Transform, TransformDescriptor, TransformError, TransformImpl};

pub static BUILTINS: &[TransformDescriptor] = &[
    TransformDescriptor {
        name: "buffer",
        doc: "Pass the input through unchanged",
        category: "wiring",
        implementation: TransformImpl::Pure(buffer),
    },
    TransformDescriptor {
        name: "not",
        doc: "Invert every bit of the input",
        category: "logic",
        implementation: TransformImpl::Pure(not),
    },
    TransformDescriptor {
        name: "and",
        doc: "High when every input bit is high",
        category: "logic",
        implementation: TransformImpl::Pure(and),
    },
    TransformDescriptor {
        name: "or",
        doc: "High when any input bit is high",
        category: "logic",
        implementation: TransformImpl::Pure(or),
    },
    TransformDescriptor {
        name: "xor",
        doc: "High when an odd number of input bits are high",
        category: "logic",
        implementation: TransformImpl::Pure(xor),
    },
    TransformDescriptor {
        name: "nand",
        doc: "Inverted and",
        category: "logic",
        implementation: TransformImpl::Pure(nand),
    },
    TransformDescriptor {
        name: "nor",
        doc: "Inverted or",
        category: "logic",
        implementation: TransformImpl::Pure(nor),
    },
    TransformDescriptor {
        name: "high",
        doc: "Constant 1",
        category: "source",
        implementation: TransformImpl::Pure(high),
    },
    TransformDescriptor {
        name: "low",
        doc: "Constant 0",
        category: "source",
        implementation: TransformImpl::Pure(low),
    },
    TransformDescriptor {
        name: "switch",
        doc: "Latch toggled by clicking, starts low",
        category: "source",
        implementation: TransformImpl::Stateful(Switch::boxed),
    },
    TransformDescriptor {
        name: "clock",
        doc: "Alternates between 0 and 1 on every evaluation, starting at 0",
        category: "source",
        implementation: TransformImpl::Stateful(Clock::boxed),
    },
];

fn required(input: Option<&Value>) -> Result<&Value> {
    input.ok_or(TransformError::MissingInput)
}

fn buffer(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(input.cloned())
}

fn invert(value: &Value) -> Value {
    let kind = match &value.kind {
        ValueKind::Bit(bit) => ValueKind::Bit(!bit),
        ValueKind::Collection(children) => {
            ValueKind::Collection(children.iter().map(invert).collect())
        }
    };
    Value {
        name: value.name.clone(),
        kind,
    }
}

fn not(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(invert(required(input)?)))
}

fn fold_leaves(input: Option<&Value>, init: bool, op: fn(bool, bool) -> bool) -> Result<bool> {
    Ok(required(input)?.leaves().into_iter().fold(init, op))
}

fn and(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::bit(fold_leaves(input, true, |a, b| a && b)?)))
}

fn or(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::bit(fold_leaves(input, false, |a, b| a || b)?)))
}

fn xor(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::bit(fold_leaves(input, false, |a, b| a ^ b)?)))
}

fn nand(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::bit(!fold_leaves(input, true, |a, b| a && b)?)))
}

fn nor(input: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::bit(!fold_leaves(input, false, |a, b| a || b)?)))
}

fn high(_: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::high()))
}

fn low(_: Option<&Value>) -> Result<Option<Value>> {
    Ok(Some(Value::low()))
}

#[derive(Debug, Default)]
struct Switch {
    on: bool,
}

impl Switch {
    fn boxed() -> Box<dyn Transform> {
        Box::new(Switch::default())
    }
}

impl Transform for Switch {
    fn apply(&mut self, _: Option<&Value>) -> Result<Option<Value>> {
        Ok(Some(Value::bit(self.on)))
    }

    fn on_click(&mut self) -> bool {
        self.on = !self.on;
        true
    }
}

#[derive(Debug, Default)]
struct Clock {
    phase: bool,
}

impl Clock {
    fn boxed() -> Box<dyn Transform> {
        Box::new(Clock::default())
    }
}

impl Transform for Clock {
    fn apply(&mut self, _: Option<&Value>) -> Result<Option<Value>> {
        let out = self.phase;
        self.phase = !self.phase;
        Ok(Some(Value::bit(out)))
    }
}
