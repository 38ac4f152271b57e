//! Hand-written recursive-descent parser for the brace-block configuration
//! grammar (spec §6): `name value` pairs, nested `{ }` blocks of kind
//! `standard`/`record`/`field`/`item`/`list`/`option`, `#` comments,
//! whitespace-separated tokens with C-style quoting.

use crate::error::ConfigError;
use crate::model::{FieldSpec, ItemSpec, ItemType, RecordSpec, Specification};

#[derive(Debug)]
enum Node {
    Assign(String, Vec<String>),
    Block(String, Vec<String>, Vec<Node>),
}

fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..i],
            _ => {}
        }
    }
    line
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut buf = String::new();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                buf.push(c);
            }
            tokens.push(buf);
            continue;
        }
        let mut buf = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            buf.push(c);
            chars.next();
        }
        tokens.push(buf);
    }
    tokens
}

/// Parse a sequence of sibling nodes until a closing `}` or end of input.
/// The returned `bool` is `true` when a `}` actually closed this sequence
/// and `false` when input ran out first — the top-level caller in
/// [`parse_specifications`] allows either (there is no enclosing `{` to
/// close), but a nested call whose caller opened a block must see `true`
/// or the block was never closed.
fn parse_nodes(lines: &[&str], pos: &mut usize) -> Result<(Vec<Node>, bool), ConfigError> {
    let mut nodes = Vec::new();
    while *pos < lines.len() {
        let line_no = *pos + 1;
        let raw = strip_comment(lines[*pos]);
        *pos += 1;
        let mut tokens = tokenize(raw);
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() == 1 && tokens[0] == "}" {
            return Ok((nodes, true));
        }
        if tokens.last().map(String::as_str) == Some("{") {
            tokens.pop();
            if tokens.is_empty() {
                return Err(ConfigError::Parse { line: line_no, message: "block opener missing a kind".into() });
            }
            let kind = tokens.remove(0);
            let (children, closed) = parse_nodes(lines, pos)?;
            if !closed {
                return Err(ConfigError::UnterminatedBlock { line: line_no });
            }
            nodes.push(Node::Block(kind, tokens, children));
        } else {
            let name = tokens.remove(0);
            nodes.push(Node::Assign(name, tokens));
        }
    }
    Ok((nodes, false))
}

fn single_arg<'a>(args: &'a [String], line: usize, what: &str) -> Result<&'a str, ConfigError> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| ConfigError::Parse { line, message: format!("{what} expects one argument") })
}

fn parse_u16(s: &str, line: usize) -> Result<u16, ConfigError> {
    s.parse().map_err(|_| ConfigError::Parse { line, message: format!("expected an integer, got {s:?}") })
}

fn parse_usize(s: &str, line: usize) -> Result<usize, ConfigError> {
    s.parse().map_err(|_| ConfigError::Parse { line, message: format!("expected an integer, got {s:?}") })
}

fn build_item(children: &[Node], line: usize) -> Result<ItemSpec, ConfigError> {
    let mut item_type = None;
    let mut spec = None;
    for node in children {
        if let Node::Assign(name, args) = node {
            match name.as_str() {
                "type" => {
                    let tag = single_arg(args, line, "type")?;
                    item_type = ItemType::parse(tag);
                    if item_type.is_none() {
                        return Err(ConfigError::Parse { line, message: format!("unknown item type {tag:?}") });
                    }
                    spec = Some(ItemSpec::new(item_type.unwrap()));
                }
                "min" => {
                    let value: i64 = single_arg(args, line, "min")?
                        .parse()
                        .map_err(|_| ConfigError::Parse { line, message: "min is not numeric".into() })?;
                    spec.get_or_insert_with(|| ItemSpec::new(ItemType::Num)).numeric_range.min = Some(value);
                }
                "max" => {
                    let value: i64 = single_arg(args, line, "max")?
                        .parse()
                        .map_err(|_| ConfigError::Parse { line, message: "max is not numeric".into() })?;
                    spec.get_or_insert_with(|| ItemSpec::new(ItemType::Num)).numeric_range.max = Some(value);
                }
                "enum" => {
                    spec.get_or_insert_with(|| ItemSpec::new(ItemType::Str)).enum_values = Some(args.clone());
                }
                other => return Err(ConfigError::Parse { line, message: format!("unknown item key {other:?}") }),
            }
        }
    }
    spec.ok_or(ConfigError::Parse { line, message: "item block missing a type".into() })
}

fn build_field(record_type: u16, args: &[String], children: &[Node], line: usize) -> Result<FieldSpec, ConfigError> {
    let arg = single_arg(args, line, "field")?;
    let field_id: u16 = match arg.split_once('.') {
        Some((_, f)) => parse_u16(f, line)?,
        None => parse_u16(arg, line)?,
    };
    let mut field = FieldSpec::new(record_type, field_id);
    for node in children {
        match node {
            Node::Assign(name, vals) => match name.as_str() {
                "occ_min" => field.occurrence.min = Some(parse_usize(single_arg(vals, line, "occ_min")?, line)? as u32),
                "occ_max" => field.occurrence.max = Some(parse_usize(single_arg(vals, line, "occ_max")?, line)? as u32),
                "size_min" => field.size.min = Some(parse_usize(single_arg(vals, line, "size_min")?, line)?),
                "size_max" => field.size.max = Some(parse_usize(single_arg(vals, line, "size_max")?, line)?),
                "required" => field.required = single_arg(vals, line, "required")? == "true",
                "custom_check" => field.custom_check = Some(single_arg(vals, line, "custom_check")?.to_string()),
                other => return Err(ConfigError::Parse { line, message: format!("unknown field key {other:?}") }),
            },
            Node::Block(kind, _, item_children) if kind == "item" => {
                field.items.push(build_item(item_children, line)?);
            }
            Node::Block(kind, ..) => {
                return Err(ConfigError::UnknownBlockKind(kind.clone()));
            }
        }
    }
    Ok(field)
}

fn build_record(args: &[String], children: &[Node], line: usize) -> Result<RecordSpec, ConfigError> {
    use crate::model::DataKindTag;
    let record_type = parse_u16(single_arg(args, line, "record")?, line)?;
    let mut record = RecordSpec::new(record_type, DataKindTag::Ascii);
    for node in children {
        match node {
            Node::Assign(name, vals) if name == "data_kind" => {
                record.data_kind = match single_arg(vals, line, "data_kind")?.to_ascii_lowercase().as_str() {
                    "ascii" => DataKindTag::Ascii,
                    "binary" => DataKindTag::Binary,
                    "mixed" => DataKindTag::Mixed,
                    other => {
                        return Err(ConfigError::Parse { line, message: format!("unknown data_kind {other:?}") })
                    }
                };
            }
            Node::Assign(name, _) => {
                return Err(ConfigError::Parse { line, message: format!("unknown record key {name:?}") })
            }
            Node::Block(kind, field_args, field_children) if kind == "field" => {
                let field = build_field(record_type, field_args, field_children, line)?;
                record.fields.insert(field.field_id, field);
            }
            Node::Block(kind, ..) => return Err(ConfigError::UnknownBlockKind(kind.clone())),
        }
    }
    Ok(record)
}

fn build_standard(args: &[String], children: &[Node], line: usize) -> Result<Specification, ConfigError> {
    let name = single_arg(args, line, "standard")?;
    let mut spec = Specification::new(name);
    for node in children {
        match node {
            Node::Assign(name, vals) if name == "parent" => {
                spec.parent = Some(single_arg(vals, line, "parent")?.to_string());
            }
            Node::Assign(name, _) => {
                return Err(ConfigError::Parse { line, message: format!("unknown standard key {name:?}") })
            }
            Node::Block(kind, record_args, record_children) if kind == "record" => {
                let record = build_record(record_args, record_children, line)?;
                spec.records.insert(record.record_type, record);
            }
            Node::Block(kind, list_args, list_children) if kind == "list" => {
                let list_name = single_arg(list_args, line, "list")?.to_string();
                let mut values = Vec::new();
                for child in list_children {
                    if let Node::Assign(name, rest) = child {
                        values.push(name.clone());
                        values.extend(rest.iter().cloned());
                    }
                }
                spec.lists.insert(list_name, values);
            }
            Node::Block(kind, option_args, option_children) if kind == "option" => {
                let option_name = single_arg(option_args, line, "option")?.to_string();
                let mut value = String::new();
                for child in option_children {
                    if let Node::Assign(name, rest) = child {
                        if name == "value" {
                            value = rest.first().cloned().unwrap_or_default();
                        }
                    }
                }
                spec.options.insert(option_name, value);
            }
            Node::Block(kind, ..) => return Err(ConfigError::UnknownBlockKind(kind.clone())),
        }
    }
    Ok(spec)
}

/// Parse every `standard { ... }` block in `text` into a [`Specification`].
pub fn parse_specifications(text: &str) -> Result<Vec<Specification>, ConfigError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut pos = 0;
    // Top level has no enclosing `{`, so running out of input here is not
    // itself an error — only a nested, unclosed block is.
    let (nodes, _) = parse_nodes(&lines, &mut pos)?;
    let mut specs = Vec::new();
    for node in nodes {
        match node {
            Node::Block(kind, args, children) if kind == "standard" => {
                specs.push(build_standard(&args, &children, 0)?);
            }
            Node::Block(kind, ..) => return Err(ConfigError::UnknownBlockKind(kind)),
            Node::Assign(name, _) => {
                return Err(ConfigError::Parse { line: 0, message: format!("top-level key {name:?} outside a standard block") })
            }
        }
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataKindTag, ItemType};

    const SAMPLE: &str = r#"
        # comment line
        standard "AN2K-2011" {
            record 1 {
                data_kind ascii
                field 1.003 {
                    occ_min 1
                    occ_max 1
                    size_min 1
                    size_max 30
                    item {
                        type Str
                    }
                }
            }
            list impression_types {
                0 1 2 3 8 9
            }
            option strict_mode {
                value true
            }
        }
    "#;

    #[test]
    fn parses_nested_blocks() {
        let specs = parse_specifications(SAMPLE).unwrap();
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.standard, "AN2K-2011");
        let record = spec.records.get(&1).unwrap();
        assert_eq!(record.data_kind, DataKindTag::Ascii);
        let field = record.fields.get(&3).unwrap();
        assert_eq!(field.size.max, Some(30));
        assert_eq!(field.items[0].item_type, ItemType::Str);
        assert_eq!(spec.lists.get("impression_types").unwrap().len(), 6);
        assert_eq!(spec.options.get("strict_mode").unwrap(), "true");
    }

    #[test]
    fn quoted_tokens_preserve_spaces() {
        let tokens = tokenize(r#"name "hello world" trailing"#);
        assert_eq!(tokens, vec!["name", "hello world", "trailing"]);
    }

    #[test]
    fn comment_after_hash_is_stripped() {
        let tokens = tokenize(strip_comment("name value # trailing comment"));
        assert_eq!(tokens, vec!["name", "value"]);
    }

    #[test]
    fn block_never_closed_is_rejected() {
        let truncated = r#"
            standard "AN2K-2011" {
                record 1 {
                    data_kind ascii
        "#;
        let err = parse_specifications(truncated).unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedBlock { .. }), "{err:?}");
    }
}
