use serde::Serialize;

/// Whether a host function only observes task state or changes it.
///
/// Mutators are the calls that can end a run with a domain violation or a
/// success message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Accessor,
    Mutator,
}

/// Signature of a host function a task exposes to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub kind: FunctionKind,
    pub description: &'static str,
}

impl FunctionSig {
    pub const fn accessor(
        name: &'static str,
        params: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            params,
            kind: FunctionKind::Accessor,
            description,
        }
    }

    pub const fn mutator(
        name: &'static str,
        params: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            params,
            kind: FunctionKind::Mutator,
            description,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Find a signature by name in a task's table.
pub fn lookup_signature<'a>(table: &'a [FunctionSig], name: &str) -> Option<&'a FunctionSig> {
    table.iter().find(|sig| sig.name == name)
}
