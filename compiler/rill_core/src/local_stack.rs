//! Frames for local variables.
//!
//! Every scope that can bind locals (the main block, `begin`/`end` blocks,
//! each user-defined function) owns one pooled [`Frame`] sized by the
//! parser's slot resolution. Entering a scope whose pooled frame is already
//! in use, as a recursive function call does, gets a fresh ephemeral frame
//! that is dropped on exit.
//!
//! Slot 0 of every frame is reserved for a function's return value. It must
//! be taken back to absent before the frame is exited.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

use crate::internal::{internal_coding_error, internal_coding_error_unless};
use crate::mlmv::Mlmv;
use crate::mlrval::Mlrval;

/// Reserved slot holding a function's return value.
pub const RETURN_VALUE_SLOT: usize = 0;

bitflags! {
    /// Set of value types a local variable accepts.
    ///
    /// Each declared gate (`var`, `str`, `num`, ...) maps to one mask; a
    /// value passes when its own single-bit type is in the mask.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeMask: u8 {
        const ABSENT = 1 << 0;
        const EMPTY = 1 << 1;
        const ERROR = 1 << 2;
        const STRING = 1 << 3;
        const INT = 1 << 4;
        const FLOAT = 1 << 5;
        const BOOLEAN = 1 << 6;
        const MAP = 1 << 7;

        const VAR = Self::ABSENT.bits()
            | Self::EMPTY.bits()
            | Self::ERROR.bits()
            | Self::STRING.bits()
            | Self::INT.bits()
            | Self::FLOAT.bits()
            | Self::BOOLEAN.bits()
            | Self::MAP.bits();
        const STR = Self::ABSENT.bits() | Self::EMPTY.bits() | Self::STRING.bits();
        const NUM = Self::ABSENT.bits() | Self::INT.bits() | Self::FLOAT.bits();
        const INT_GATE = Self::ABSENT.bits() | Self::INT.bits();
        const FLOAT_GATE = Self::ABSENT.bits() | Self::FLOAT.bits();
        const BOOL = Self::ABSENT.bits() | Self::BOOLEAN.bits();
        const MAP_GATE = Self::ABSENT.bits() | Self::MAP.bits();
    }
}

impl TypeMask {
    /// Mask for a declared gate keyword.
    pub fn from_gate_name(name: &str) -> Option<Self> {
        Some(match name {
            "var" | "any" => TypeMask::VAR,
            "str" => TypeMask::STR,
            "num" => TypeMask::NUM,
            "int" => TypeMask::INT_GATE,
            "float" => TypeMask::FLOAT_GATE,
            "bool" => TypeMask::BOOL,
            "map" => TypeMask::MAP_GATE,
            _ => return None,
        })
    }

    /// Gate keyword for this mask, if it is one of the declared gates.
    pub fn gate_name(self) -> Option<&'static str> {
        Some(match self {
            m if m == TypeMask::VAR => "var",
            m if m == TypeMask::STR => "str",
            m if m == TypeMask::NUM => "num",
            m if m == TypeMask::INT_GATE => "int",
            m if m == TypeMask::FLOAT_GATE => "float",
            m if m == TypeMask::BOOL => "bool",
            m if m == TypeMask::MAP_GATE => "map",
            _ => return None,
        })
    }

    /// Single-bit mask of a value's type.
    pub fn of(value: &Mlmv) -> Self {
        match value {
            Mlmv::Map(_) => TypeMask::MAP,
            Mlmv::Terminal(scalar) => match scalar {
                Mlrval::Absent => TypeMask::ABSENT,
                Mlrval::Empty => TypeMask::EMPTY,
                Mlrval::Error => TypeMask::ERROR,
                Mlrval::String(_) => TypeMask::STRING,
                Mlrval::Int(_) => TypeMask::INT,
                Mlrval::Float(_) => TypeMask::FLOAT,
                Mlrval::Boolean(_) => TypeMask::BOOLEAN,
            },
        }
    }

    #[inline]
    pub fn accepts(self, value: &Mlmv) -> bool {
        self.contains(TypeMask::of(value))
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gate_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#04x}", self.bits()),
        }
    }
}

/// A value refused by a local's type gate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("type gate `{gate}` rejects a value of type {actual}")]
pub struct TypeGateViolation {
    pub gate: TypeMask,
    pub actual: &'static str,
}

#[derive(Clone, Debug)]
struct LocalSlot {
    value: Mlmv,
    gate: TypeMask,
}

impl LocalSlot {
    const UNSET: LocalSlot = LocalSlot {
        value: Mlmv::absent(),
        gate: TypeMask::VAR,
    };
}

/// Storage for one activation of a scope.
#[derive(Clone, Debug)]
pub struct Frame {
    slots: Vec<LocalSlot>,
    in_use: bool,
    ephemeral: bool,
}

impl Frame {
    fn new(size: usize, ephemeral: bool) -> Self {
        Frame {
            slots: vec![LocalSlot::UNSET; size.max(RETURN_VALUE_SLOT + 1)],
            in_use: false,
            ephemeral,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    #[track_caller]
    fn slot(&self, index: usize) -> &LocalSlot {
        match self.slots.get(index) {
            Some(slot) => slot,
            None => internal_coding_error("local slot index out of frame bounds"),
        }
    }

    #[track_caller]
    fn slot_mut(&mut self, index: usize) -> &mut LocalSlot {
        match self.slots.get_mut(index) {
            Some(slot) => slot,
            None => internal_coding_error("local slot index out of frame bounds"),
        }
    }

    pub fn get(&self, index: usize) -> &Mlmv {
        &self.slot(index).value
    }

    /// The value under `path` inside slot `index`, if there is one.
    pub fn get_indexed(&self, index: usize, path: &[String]) -> Option<&Mlmv> {
        self.get(index).get(path)
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Mlmv {
        &mut self.slot_mut(index).value
    }

    pub fn gate(&self, index: usize) -> TypeMask {
        self.slot(index).gate
    }

    /// Binds slot `index` with a new gate and initial value.
    pub fn define(
        &mut self,
        index: usize,
        gate: TypeMask,
        value: Mlmv,
    ) -> Result<(), TypeGateViolation> {
        check_gate(gate, &value)?;
        *self.slot_mut(index) = LocalSlot { value, gate };
        Ok(())
    }

    /// Replaces the value in slot `index`, keeping its gate.
    pub fn assign(&mut self, index: usize, value: Mlmv) -> Result<(), TypeGateViolation> {
        let slot = self.slot_mut(index);
        check_gate(slot.gate, &value)?;
        slot.value = value;
        Ok(())
    }

    /// Stores `value` under `path` inside slot `index`, turning the slot
    /// into a map first if needed.
    pub fn assign_indexed(
        &mut self,
        index: usize,
        path: &[String],
        value: Mlmv,
    ) -> Result<(), TypeGateViolation> {
        let slot = self.slot_mut(index);
        if path.is_empty() {
            check_gate(slot.gate, &value)?;
        } else {
            check_gate(slot.gate, &Mlmv::empty_map())?;
        }
        slot.value.put(path, value);
        Ok(())
    }

    /// Resets slot `index` to absent. Always permitted.
    pub fn unset(&mut self, index: usize) {
        self.slot_mut(index).value = Mlmv::absent();
    }

    pub fn unset_indexed(&mut self, index: usize, path: &[String]) {
        if path.is_empty() {
            self.unset(index);
        } else {
            self.slot_mut(index).value.remove(path);
        }
    }

    /// Moves the value out of slot `index`, leaving it absent.
    pub fn take(&mut self, index: usize) -> Mlmv {
        std::mem::take(&mut self.slot_mut(index).value)
    }

    fn clear(&mut self) {
        self.slots.fill(LocalSlot::UNSET);
    }
}

fn check_gate(gate: TypeMask, value: &Mlmv) -> Result<(), TypeGateViolation> {
    if gate.accepts(value) {
        Ok(())
    } else {
        Err(TypeGateViolation {
            gate,
            actual: value.type_name(),
        })
    }
}

/// Handle to a scope's pooled frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Active {
    Pooled(ScopeId),
    Ephemeral(Frame),
}

/// The stack of active frames plus the per-scope frame pool.
#[derive(Debug, Default)]
pub struct LocalStack {
    pool: Vec<Frame>,
    active: Vec<Active>,
}

impl LocalStack {
    pub fn new() -> Self {
        LocalStack::default()
    }

    /// Allocates the pooled frame for a scope needing `size` slots.
    pub fn register_scope(&mut self, size: usize) -> ScopeId {
        let id = ScopeId(self.pool.len());
        self.pool.push(Frame::new(size, false));
        id
    }

    pub fn scope_count(&self) -> usize {
        self.pool.len()
    }

    /// Number of frames currently entered.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Pushes a frame for `scope`: its pooled frame if free, else a new
    /// ephemeral one of the same size. Either way every slot starts absent.
    pub fn enter(&mut self, scope: ScopeId) -> &mut Frame {
        let pooled = self.pooled_mut(scope);
        if pooled.in_use {
            let mut frame = Frame::new(pooled.size(), true);
            frame.in_use = true;
            tracing::trace!(scope = scope.0, depth = self.active.len(), "enter ephemeral frame");
            self.active.push(Active::Ephemeral(frame));
        } else {
            pooled.in_use = true;
            tracing::trace!(scope = scope.0, depth = self.active.len(), "enter pooled frame");
            self.active.push(Active::Pooled(scope));
        }
        self.top_mut()
    }

    /// Pops the top frame, clearing it. A pooled frame becomes reusable;
    /// an ephemeral one is released.
    pub fn exit(&mut self) {
        let Some(active) = self.active.pop() else {
            internal_coding_error("exit with no active frame");
        };
        match active {
            Active::Pooled(scope) => {
                let frame = self.pooled_mut(scope);
                internal_coding_error_unless(
                    frame.get(RETURN_VALUE_SLOT).is_absent(),
                    "frame exited with its return-value slot still set",
                );
                frame.clear();
                frame.in_use = false;
                tracing::trace!(scope = scope.0, depth = self.active.len(), "exit pooled frame");
            }
            Active::Ephemeral(frame) => {
                internal_coding_error_unless(
                    frame.get(RETURN_VALUE_SLOT).is_absent(),
                    "frame exited with its return-value slot still set",
                );
                tracing::trace!(depth = self.active.len(), "exit ephemeral frame");
            }
        }
    }

    #[track_caller]
    pub fn top(&self) -> &Frame {
        match self.active.last() {
            Some(Active::Pooled(scope)) => self.pooled(*scope),
            Some(Active::Ephemeral(frame)) => frame,
            None => internal_coding_error("local access with no active frame"),
        }
    }

    #[track_caller]
    pub fn top_mut(&mut self) -> &mut Frame {
        let frame = match self.active.last_mut() {
            Some(Active::Pooled(scope)) => self.pool.get_mut(scope.0),
            Some(Active::Ephemeral(frame)) => Some(frame),
            None => None,
        };
        match frame {
            Some(frame) => frame,
            None => internal_coding_error("local access with no active frame"),
        }
    }

    /// The pooled frame of `scope`, whether or not it is active.
    #[track_caller]
    pub fn pooled(&self, scope: ScopeId) -> &Frame {
        match self.pool.get(scope.0) {
            Some(frame) => frame,
            None => internal_coding_error("unknown scope id"),
        }
    }

    #[track_caller]
    fn pooled_mut(&mut self, scope: ScopeId) -> &mut Frame {
        match self.pool.get_mut(scope.0) {
            Some(frame) => frame,
            None => internal_coding_error("unknown scope id"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod tests;
