//! Function reference for a task: what a script may call.
//!
//! The plain-text form is shown by `blockplay functions` and next to the
//! editor; the JSON table feeds tooling. Both are generated from the task's
//! signature table and the `Math` builtins, so they cannot drift.

use serde::Serialize;

use blockplay_types::{FunctionKind, FunctionSig, MathConst, MathFn, HIGHLIGHT_FUNCTION};

/// One callable entry in the JSON table.
#[derive(Debug, Serialize)]
struct TableEntry<'a> {
    name: String,
    params: Vec<&'a str>,
    kind: &'static str,
    description: &'a str,
}

/// Generate the plain-text reference for one task.
pub fn generate_reference(task_name: &str, signatures: &[FunctionSig]) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("TASK {task_name}\n\n"));

    for (title, kind) in [
        ("READ (no effect on the task):", FunctionKind::Accessor),
        ("MOVE (may end the run):", FunctionKind::Mutator),
    ] {
        out.push_str(title);
        out.push('\n');
        for sig in signatures.iter().filter(|s| s.kind == kind) {
            out.push_str(&format!(
                "  {}({})  {}\n",
                sig.name,
                sig.params.join(", "),
                sig.description
            ));
        }
        out.push('\n');
    }

    out.push_str("MATH:\n  ");
    let math: Vec<&str> = MathFn::ALL
        .iter()
        .map(|f| f.name())
        .chain(MathConst::ALL.iter().map(|c| c.name()))
        .collect();
    out.push_str(&math.join(", "));
    out.push_str("\n\n");
    out.push_str(REFERENCE_POSTAMBLE);
    out
}

/// Generate a JSON table of every callable name for one task.
pub fn generate_function_table(signatures: &[FunctionSig]) -> String {
    let mut entries: Vec<TableEntry<'_>> = signatures
        .iter()
        .map(|sig| TableEntry {
            name: sig.name.to_string(),
            params: sig.params.to_vec(),
            kind: match sig.kind {
                FunctionKind::Accessor => "accessor",
                FunctionKind::Mutator => "mutator",
            },
            description: sig.description,
        })
        .collect();
    entries.extend(MathFn::ALL.iter().map(|f| TableEntry {
        name: format!("Math.{}", f.name()),
        params: Vec::new(),
        kind: "math",
        description: "",
    }));
    entries.push(TableEntry {
        name: HIGHLIGHT_FUNCTION.to_string(),
        params: vec!["block_id"],
        kind: "marker",
        description: "inserted by the block editor before each block",
    });
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

const REFERENCE_POSTAMBLE: &str = "\
LANGUAGE:
  var a, b = 1;  a = e;  a += e;  a++;  if (c) { } else { }
  while (c) { }  for (var i = 0; i < n; i++) { }  break;  continue;
  Operators: + - * / %  < <= > >=  == != === !==  && || !
";
