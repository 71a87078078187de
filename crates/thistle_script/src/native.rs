//! Pure native builtins: arithmetic, comparison, strings, lists.
//!
//! These take no host access; world-touching builtins live in the
//! interpreter and go through [`crate::ScriptHost`].

use thistle_foundation::{Error, ErrorKind, Result, Value};

/// A pure native function.
pub type NativeFn = fn(&[Value]) -> Result<Value>;

/// Looks up a pure builtin by name.
#[must_use]
pub fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "+" => add,
        "-" => sub,
        "*" => mul,
        "/" => div,
        "rem" => rem,
        "=" => eq,
        "!=" => ne,
        "<" => lt,
        "<=" => le,
        ">" => gt,
        ">=" => ge,
        "not" => not,
        "str" => str_concat,
        "lower" => lower,
        "upper" => upper,
        "len" => len,
        "nth" => nth,
        "list" => list,
        "first" => first,
        "rest" => rest,
        "append" => append,
        "contains?" => contains,
        "join" => join,
        _ => return None,
    })
}

fn want_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::arity_mismatch(name, expected, args.len()))
    }
}

fn numeric_fold(
    name: &str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::arity_mismatch(name, 1, 0));
    }
    let mut acc = args[0].clone();
    for next in &args[1..] {
        acc = match (&acc, next) {
            (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
                .map(Value::Int)
                .ok_or_else(|| Error::new(ErrorKind::Internal(format!("{name}: overflow"))))?,
            (a, b) => {
                let (Some(x), Some(y)) = (a.as_number(), b.as_number()) else {
                    return Err(Error::new(ErrorKind::Internal(format!(
                        "{name}: expected numbers, got {a} and {b}"
                    ))));
                };
                Value::Float(float_op(x, y))
            }
        };
    }
    Ok(acc)
}

fn add(args: &[Value]) -> Result<Value> {
    numeric_fold("+", args, i64::checked_add, |a, b| a + b)
}

fn sub(args: &[Value]) -> Result<Value> {
    if args.len() == 1 {
        return match &args[0] {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(n) => Ok(Value::Float(-n)),
            v => Err(Error::new(ErrorKind::Internal(format!(
                "-: expected number, got {v}"
            )))),
        };
    }
    numeric_fold("-", args, i64::checked_sub, |a, b| a - b)
}

fn mul(args: &[Value]) -> Result<Value> {
    numeric_fold("*", args, i64::checked_mul, |a, b| a * b)
}

fn div(args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::arity_mismatch("/", 1, 0));
    }
    for v in &args[1..] {
        if v.as_number() == Some(0.0) {
            return Err(Error::new(ErrorKind::DivisionByZero));
        }
    }
    numeric_fold("/", args, i64::checked_div, |a, b| a / b)
}

fn rem(args: &[Value]) -> Result<Value> {
    want_arity("rem", args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Int(_), Value::Int(0)) => Err(Error::new(ErrorKind::DivisionByZero)),
        (Value::Int(a), Value::Int(b)) => a
            .checked_rem(*b)
            .map(Value::Int)
            .ok_or_else(|| Error::new(ErrorKind::Internal("rem: overflow".to_string()))),
        (a, b) => Err(Error::new(ErrorKind::Internal(format!(
            "rem: expected integers, got {a} and {b}"
        )))),
    }
}

fn eq(args: &[Value]) -> Result<Value> {
    want_arity("=", args, 2)?;
    Ok(Value::Bool(args[0] == args[1]))
}

fn ne(args: &[Value]) -> Result<Value> {
    want_arity("!=", args, 2)?;
    Ok(Value::Bool(args[0] != args[1]))
}

fn compare(name: &str, args: &[Value], test: fn(std::cmp::Ordering) -> bool) -> Result<Value> {
    want_arity(name, args, 2)?;
    args[0].partial_cmp(&args[1]).map_or_else(
        || {
            Err(Error::new(ErrorKind::Internal(format!(
                "{name}: cannot compare {} and {}",
                args[0], args[1]
            ))))
        },
        |ord| Ok(Value::Bool(test(ord))),
    )
}

fn lt(args: &[Value]) -> Result<Value> {
    compare("<", args, std::cmp::Ordering::is_lt)
}

fn le(args: &[Value]) -> Result<Value> {
    compare("<=", args, std::cmp::Ordering::is_le)
}

fn gt(args: &[Value]) -> Result<Value> {
    compare(">", args, std::cmp::Ordering::is_gt)
}

fn ge(args: &[Value]) -> Result<Value> {
    compare(">=", args, std::cmp::Ordering::is_ge)
}

fn not(args: &[Value]) -> Result<Value> {
    want_arity("not", args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

fn str_concat(args: &[Value]) -> Result<Value> {
    let mut out = String::new();
    for v in args {
        match v {
            Value::Nil => {}
            other => out.push_str(&other.to_string()),
        }
    }
    Ok(Value::from(out))
}

fn lower(args: &[Value]) -> Result<Value> {
    want_arity("lower", args, 1)?;
    Ok(Value::from(args[0].to_string().to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value> {
    want_arity("upper", args, 1)?;
    Ok(Value::from(args[0].to_string().to_uppercase()))
}

fn len(args: &[Value]) -> Result<Value> {
    want_arity("len", args, 1)?;
    #[allow(clippy::cast_possible_wrap)]
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(v) => Ok(Value::Int(v.len() as i64)),
        v => Err(Error::new(ErrorKind::Internal(format!(
            "len: expected string or list, got {v}"
        )))),
    }
}

fn nth(args: &[Value]) -> Result<Value> {
    want_arity("nth", args, 2)?;
    let Value::List(items) = &args[0] else {
        return Err(Error::new(ErrorKind::Internal(format!(
            "nth: expected list, got {}",
            args[0]
        ))));
    };
    let Some(index) = args[1].as_int().and_then(|n| usize::try_from(n).ok()) else {
        return Err(Error::new(ErrorKind::Internal(format!(
            "nth: expected non-negative index, got {}",
            args[1]
        ))));
    };
    items.get(index).cloned().ok_or_else(|| {
        Error::new(ErrorKind::IndexOutOfBounds {
            index,
            length: items.len(),
        })
    })
}

fn list(args: &[Value]) -> Result<Value> {
    Ok(Value::List(args.iter().cloned().collect()))
}

fn first(args: &[Value]) -> Result<Value> {
    want_arity("first", args, 1)?;
    match &args[0] {
        Value::List(v) => Ok(v.front().cloned().unwrap_or(Value::Nil)),
        v => Err(Error::new(ErrorKind::Internal(format!(
            "first: expected list, got {v}"
        )))),
    }
}

fn rest(args: &[Value]) -> Result<Value> {
    want_arity("rest", args, 1)?;
    match &args[0] {
        Value::List(v) => Ok(Value::List(v.iter().skip(1).cloned().collect())),
        v => Err(Error::new(ErrorKind::Internal(format!(
            "rest: expected list, got {v}"
        )))),
    }
}

fn append(args: &[Value]) -> Result<Value> {
    want_arity("append", args, 2)?;
    match &args[0] {
        Value::List(v) => {
            let mut out = v.clone();
            out.push_back(args[1].clone());
            Ok(Value::List(out))
        }
        v => Err(Error::new(ErrorKind::Internal(format!(
            "append: expected list, got {v}"
        )))),
    }
}

fn contains(args: &[Value]) -> Result<Value> {
    want_arity("contains?", args, 2)?;
    match &args[0] {
        Value::List(v) => Ok(Value::Bool(v.contains(&args[1]))),
        Value::Str(s) => Ok(Value::Bool(s.contains(&args[1].to_string()))),
        v => Err(Error::new(ErrorKind::Internal(format!(
            "contains?: expected list or string, got {v}"
        )))),
    }
}

fn join(args: &[Value]) -> Result<Value> {
    want_arity("join", args, 2)?;
    let Value::List(items) = &args[0] else {
        return Err(Error::new(ErrorKind::Internal(format!(
            "join: expected list, got {}",
            args[0]
        ))));
    };
    let sep = args[1].to_string();
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&sep);
    Ok(Value::from(joined))
}
