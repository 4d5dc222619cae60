use std::fmt;

pub(crate) enum Operation<'a> {
    Evaluate(&'a str),
    Call { arity: usize },
    GetField(&'a str),
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Evaluate(source) => {
                let first_line = source.lines().next().unwrap_or("");
                if first_line.len() > 40 || source.lines().nth(1).is_some() {
                    let cut = first_line
                        .char_indices()
                        .nth(40)
                        .map(|(i, _)| i)
                        .unwrap_or(first_line.len());
                    write!(f, "evaluate {:?}...", &first_line[..cut])
                } else {
                    write!(f, "evaluate {:?}", first_line)
                }
            }
            Operation::Call { arity } => write!(f, "call arity={}", arity),
            Operation::GetField(name) => write!(f, "get_field {}", name),
        }
    }
}

pub(crate) fn boundary_event(op: &Operation<'_>, depth: usize, outcome: &str) {
    eprintln!("[embed] {} depth={} -> {}", op, depth, outcome);
}

pub(crate) fn lifecycle_event(message: &str) {
    eprintln!("[embed] {}", message);
}
