//! Prompt assembly for formula completions.
//!
//! Builds the Python-flavored prompt a provider sees: dataclass-style
//! schemas for the document's tables, then a property stub for the column
//! being completed, with the user's description as its docstring. Also
//! normalizes returned method bodies back into formula form.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::CompletionError;

/// Column types of the document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Numeric,
    Int,
    Bool,
    Date,
    DateTime,
    /// Choice column with its allowed values.
    Choice(Vec<String>),
    /// Multi-select choice column.
    ChoiceList(Vec<String>),
    /// Reference to a row of another table.
    Ref(String),
    /// Reference to a list of rows of another table.
    RefList(String),
    Any,
}

impl ColumnType {
    /// The Python type annotation used in generated schemas.
    pub fn annotation(&self) -> String {
        match self {
            ColumnType::Text => "str".to_string(),
            ColumnType::Numeric => "float".to_string(),
            ColumnType::Int => "int".to_string(),
            ColumnType::Bool => "bool".to_string(),
            ColumnType::Date => "datetime.date".to_string(),
            ColumnType::DateTime => "datetime.datetime".to_string(),
            ColumnType::Choice(choices) => literal(choices),
            ColumnType::ChoiceList(choices) => format!("Tuple[{}, ...]", literal(choices)),
            ColumnType::Ref(table_id) => table_id.clone(),
            ColumnType::RefList(table_id) => format!("List[{table_id}]"),
            ColumnType::Any => "Any".to_string(),
        }
    }
}

/// `Literal['A', 'B']`, or `str` when the choice list is empty.
fn literal(choices: &[String]) -> String {
    if choices.is_empty() {
        return "str".to_string();
    }
    let quoted: Vec<String> = choices.iter().map(|choice| format!("'{choice}'")).collect();
    format!("Literal[{}]", quoted.join(", "))
}

#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub col_id: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table_id: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    fn column(&self, col_id: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.col_id == col_id)
    }
}

/// Render a table as a `@dataclass` definition.
///
/// `exclude_col_id` drops the column being completed; `lookups` adds the
/// `lookupRecords`/`lookupOne` helper stubs the formula environment offers.
pub fn class_schema(table: &TableSchema, exclude_col_id: Option<&str>, lookups: bool) -> String {
    let table_id = &table.table_id;
    let mut result = format!("@dataclass\nclass {table_id}:\n");

    if lookups {
        let mut params = Vec::new();
        let mut forwarded = Vec::new();
        for column in &table.columns {
            if Some(column.col_id.as_str()) != exclude_col_id {
                params.push(format!("{} = None", column.col_id));
                forwarded.push(format!("{}={}", column.col_id, column.col_id));
            }
        }
        params.push("sort_by = None".to_string());
        forwarded.push("sort_by=sort_by".to_string());
        let args = params.join(", ");
        let args2 = forwarded.join(", ");

        result.push_str("     def __len__(self):\n");
        result.push_str(&format!("        return len({table_id}.lookupRecords())\n"));
        result.push_str("    @staticmethod\n");
        result.push_str(&format!("    def lookupRecords({args}) -> List[{table_id}]:\n"));
        result.push_str("       # ...\n");
        result.push_str("    @staticmethod\n");
        result.push_str(&format!("    def lookupOne({args}) -> {table_id}:\n"));
        result.push_str("       '''\n");
        result.push_str("       Filter for one result matching the keys provided.\n");
        result.push_str("       To control order, use e.g. `sort_by='Key' or `sort_by='-Key'`.\n");
        result.push_str("       '''\n");
        result.push_str(&format!("       return {table_id}.lookupRecords({args2})[0]\n"));
        result.push('\n');
    }

    for column in &table.columns {
        if Some(column.col_id.as_str()) != exclude_col_id {
            result.push_str(&format!(
                "    {}: {}\n",
                column.col_id,
                column.column_type.annotation()
            ));
        }
    }
    result.push('\n');
    result
}

/// Build the full prompt for completing `col_id` on `table`.
///
/// Related tables come first, sorted by table id, then the target table with
/// the target column excluded and lookup stubs included, then a `@property`
/// stub whose return annotation is the target column's type and whose
/// docstring is `description`.
pub fn formula_prompt(
    other_tables: &[TableSchema],
    table: &TableSchema,
    col_id: &str,
    description: &str,
) -> Result<String, CompletionError> {
    let column = table
        .column(col_id)
        .ok_or_else(|| CompletionError::UnknownColumn {
            table_id: table.table_id.clone(),
            col_id: col_id.to_string(),
        })?;

    let mut others: Vec<&TableSchema> = other_tables
        .iter()
        .filter(|other| other.table_id != table.table_id)
        .collect();
    others.sort_by(|a, b| a.table_id.cmp(&b.table_id));

    let mut result = String::new();
    for other in others {
        result.push_str(&class_schema(other, None, false));
    }
    result.push_str(&class_schema(table, Some(col_id), true));

    result.push_str("    @property\n");
    result.push_str(&format!(
        "    def {col_id}(self) -> {}:\n",
        column.column_type.annotation()
    ));
    result.push_str("        \"\"\"\n");
    for line in description.lines() {
        if line.trim().is_empty() {
            result.push_str(line);
        } else {
            result.push_str("        ");
            result.push_str(line);
        }
        result.push('\n');
    }
    result.push_str("        \"\"\"\n");
    Ok(result)
}

static SELF_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bself\b").expect("pattern is valid"));

/// Normalize a returned method body: dedent it and rewrite `self` to `rec`.
///
/// The rewrite is textual, so `self` inside string literals is replaced too.
pub fn convert_completion(completion: &str) -> String {
    let dedented = dedent(completion);
    SELF_REFERENCE.replace_all(&dedented, "rec").into_owned()
}

/// Strip the whitespace prefix shared by all non-blank lines.
///
/// Whitespace-only lines are ignored when computing the prefix and come out
/// empty.
pub fn dedent(text: &str) -> String {
    let mut prefix: Option<&str> = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        prefix = Some(match prefix {
            None => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
    }
    let prefix = prefix.unwrap_or("");

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim().is_empty() {
            // normalized to a bare newline
        } else {
            out.push_str(&line[prefix.len()..]);
        }
        out.push('\n');
    }
    if !text.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_table() -> TableSchema {
        TableSchema {
            table_id: "Orders".to_string(),
            columns: vec![
                ColumnSchema {
                    col_id: "Quantity".to_string(),
                    column_type: ColumnType::Int,
                },
                ColumnSchema {
                    col_id: "Status".to_string(),
                    column_type: ColumnType::Choice(vec![
                        "Open".to_string(),
                        "Closed".to_string(),
                    ]),
                },
                ColumnSchema {
                    col_id: "Total".to_string(),
                    column_type: ColumnType::Numeric,
                },
            ],
        }
    }

    #[test]
    fn annotations_map_to_python_types() {
        assert_eq!(ColumnType::Text.annotation(), "str");
        assert_eq!(ColumnType::Numeric.annotation(), "float");
        assert_eq!(ColumnType::DateTime.annotation(), "datetime.datetime");
        assert_eq!(
            ColumnType::Choice(vec!["A".to_string(), "B".to_string()]).annotation(),
            "Literal['A', 'B']"
        );
        assert_eq!(ColumnType::Choice(vec![]).annotation(), "str");
        assert_eq!(
            ColumnType::ChoiceList(vec!["A".to_string()]).annotation(),
            "Tuple[Literal['A'], ...]"
        );
        assert_eq!(ColumnType::Ref("People".to_string()).annotation(), "People");
        assert_eq!(
            ColumnType::RefList("People".to_string()).annotation(),
            "List[People]"
        );
    }

    #[test]
    fn class_schema_lists_columns() {
        let schema = class_schema(&orders_table(), None, false);
        assert_eq!(
            schema,
            "@dataclass\nclass Orders:\n    Quantity: int\n    Status: Literal['Open', 'Closed']\n    Total: float\n\n"
        );
    }

    #[test]
    fn class_schema_excludes_the_target_column() {
        let schema = class_schema(&orders_table(), Some("Total"), false);
        assert!(!schema.contains("Total"));
        assert!(schema.contains("Quantity: int"));
    }

    #[test]
    fn class_schema_with_lookups_adds_helper_stubs() {
        let schema = class_schema(&orders_table(), Some("Total"), true);
        assert!(schema.contains("def lookupRecords(Quantity = None, Status = None, sort_by = None) -> List[Orders]:"));
        assert!(schema.contains("def lookupOne(Quantity = None, Status = None, sort_by = None) -> Orders:"));
        assert!(schema.contains("return Orders.lookupRecords(Quantity=Quantity, Status=Status, sort_by=sort_by)[0]"));
    }

    #[test]
    fn formula_prompt_ends_with_the_property_stub() {
        let prompt = formula_prompt(&[], &orders_table(), "Total", "Quantity times price.")
            .expect("prompt");
        assert!(prompt.ends_with(
            "    @property\n    def Total(self) -> float:\n        \"\"\"\n        Quantity times price.\n        \"\"\"\n"
        ));
        assert!(!prompt.contains("    Total: float"));
    }

    #[test]
    fn formula_prompt_sorts_related_tables() {
        let people = TableSchema {
            table_id: "People".to_string(),
            columns: vec![ColumnSchema {
                col_id: "Name".to_string(),
                column_type: ColumnType::Text,
            }],
        };
        let accounts = TableSchema {
            table_id: "Accounts".to_string(),
            columns: vec![ColumnSchema {
                col_id: "Owner".to_string(),
                column_type: ColumnType::Ref("People".to_string()),
            }],
        };

        let prompt = formula_prompt(&[people, accounts], &orders_table(), "Total", "Sum.")
            .expect("prompt");
        let accounts_at = prompt.find("class Accounts").expect("accounts schema");
        let people_at = prompt.find("class People").expect("people schema");
        assert!(accounts_at < people_at);
    }

    #[test]
    fn formula_prompt_rejects_unknown_columns() {
        let err = formula_prompt(&[], &orders_table(), "Missing", "Nope.").unwrap_err();
        assert!(matches!(err, CompletionError::UnknownColumn { .. }));
    }

    #[test]
    fn multiline_descriptions_are_indented() {
        let prompt = formula_prompt(&[], &orders_table(), "Total", "Line one.\nLine two.")
            .expect("prompt");
        assert!(prompt.contains("        Line one.\n        Line two.\n"));
    }

    #[test]
    fn dedent_strips_the_common_prefix() {
        assert_eq!(dedent("    a\n        b\n    c"), "a\n    b\nc");
    }

    #[test]
    fn dedent_ignores_blank_lines() {
        assert_eq!(dedent("    a\n\n    b\n"), "a\n\nb\n");
    }

    #[test]
    fn convert_completion_rewrites_self_to_rec() {
        assert_eq!(
            convert_completion("    return self.Amount + self.Tax\n"),
            "return rec.Amount + rec.Tax\n"
        );
    }

    #[test]
    fn convert_completion_leaves_words_containing_self_alone() {
        assert_eq!(convert_completion("return itself\n"), "return itself\n");
    }
}
