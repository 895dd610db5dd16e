//! Field tag resolution and cached record descriptors.
//!
//! A tag is the comma-separated string given with `#[orm(sql = "...")]`.
//! Its first token names the column; an `auto_increment` token (any case)
//! keeps the field out of insert statements.

/// Semantic type of a record field, used to parse column text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    UInt,
    Float32,
    Float64,
    Bool,
    Text,
}

/// Raw, unresolved field metadata as declared on the record type.
///
/// `#[derive(Record)]` emits one of these per struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Declared Rust field name.
    pub name: &'static str,
    /// The `sql` tag, if any.
    pub tag: Option<&'static str>,
    pub kind: FieldKind,
    /// Whether the field is `pub`.
    pub visible: bool,
}

/// Resolved mapping between one record field and its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub field_name: &'static str,
    pub column: String,
    pub kind: FieldKind,
    pub visible: bool,
    pub auto_increment: bool,
}

impl FieldMapping {
    /// Resolve a field's column name and modifiers from its tag.
    pub fn resolve(spec: &FieldSpec) -> Self {
        let (column, auto_increment) = match spec.tag.filter(|t| !t.is_empty()) {
            Some(tag) => {
                let column = tag.split(',').next().unwrap_or_default().trim();
                let column = if column.is_empty() { spec.name } else { column };
                (column.to_string(), is_auto_increment(tag))
            }
            None => (spec.name.to_string(), false),
        };

        Self {
            field_name: spec.name,
            column,
            kind: spec.kind,
            visible: spec.visible,
            auto_increment,
        }
    }

    /// Whether the field contributes a column/value to insert statements.
    pub fn insert_eligible(&self) -> bool {
        self.visible && !self.auto_increment
    }
}

fn is_auto_increment(tag: &str) -> bool {
    tag.to_ascii_lowercase().contains("auto_increment")
}

/// Per-type field mappings, built once and cached by the record type.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    type_name: &'static str,
    fields: Vec<FieldMapping>,
}

impl RecordDescriptor {
    pub fn new(type_name: &'static str, specs: &[FieldSpec]) -> Self {
        Self {
            type_name,
            fields: specs.iter().map(FieldMapping::resolve).collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All fields in declaration order; indices match `Record::field_value`.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Indices of fields usable in filters and updates.
    pub fn visible_fields(&self) -> impl Iterator<Item = (usize, &FieldMapping)> {
        self.fields.iter().enumerate().filter(|(_, f)| f.visible)
    }

    /// Indices of fields written by insert/replace.
    pub fn insert_fields(&self) -> impl Iterator<Item = (usize, &FieldMapping)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.insert_eligible())
    }

    /// Comma-joined insert column list.
    pub fn insert_columns(&self) -> String {
        self.insert_fields()
            .map(|(_, f)| f.column.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Indices of the visible fields mapped to `column`.
    pub fn fields_for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.visible_fields()
            .filter(move |(_, f)| f.column == column)
            .map(|(i, _)| i)
    }
}
