//! Declared column type -> migration directive and model cast.

use crate::schema::{ColumnType, EnumDefinition};

pub const DEFAULT_LENGTH: u32 = 255;
pub const DEFAULT_PRECISION: u32 = 8;
pub const DEFAULT_SCALE: u32 = 2;

/// Declared DBML type, classified from its lower-cased base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    BigInteger,
    SmallInteger,
    TinyInteger,
    MediumInteger,
    Text,
    MediumText,
    LongText,
    Boolean,
    Timestamp,
    Decimal,
    Json,
    Enum,
    Uuid,
    Char,
    Varchar,
    Date,
    Time,
    Double,
    Float,
    Morphs,
    Unknown,
}

impl DeclaredType {
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        let base = lower.split('(').next().unwrap_or(&lower).trim();

        match base {
            "int" | "integer" | "int4" | "serial" => Self::Integer,
            "bigint" | "int8" | "bigserial" => Self::BigInteger,
            "smallint" | "int2" => Self::SmallInteger,
            "tinyint" => Self::TinyInteger,
            "mediumint" => Self::MediumInteger,
            "text" => Self::Text,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "bool" | "boolean" => Self::Boolean,
            "timestamp" | "datetime" | "timestamptz" => Self::Timestamp,
            "decimal" | "numeric" => Self::Decimal,
            "json" | "jsonb" => Self::Json,
            "enum" => Self::Enum,
            "uuid" => Self::Uuid,
            "char" | "character" => Self::Char,
            "varchar" | "string" | "character varying" => Self::Varchar,
            "date" => Self::Date,
            "time" => Self::Time,
            "double" | "double precision" => Self::Double,
            "float" | "real" => Self::Float,
            "morph" | "morphs" => Self::Morphs,
            _ => Self::Unknown,
        }
    }
}

/// Migration column directive family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    Integer,
    BigInteger,
    SmallInteger,
    TinyInteger,
    MediumInteger,
    Text,
    MediumText,
    LongText,
    Boolean,
    Timestamp,
    Decimal { precision: u32, scale: u32 },
    Json,
    Enum(Vec<String>),
    Uuid,
    Char { length: u32 },
    String { length: u32 },
    Date,
    Time,
    Double,
    Float,
    Morphs,
}

impl StorageType {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::BigInteger => "bigInteger",
            Self::SmallInteger => "smallInteger",
            Self::TinyInteger => "tinyInteger",
            Self::MediumInteger => "mediumInteger",
            Self::Text => "text",
            Self::MediumText => "mediumText",
            Self::LongText => "longText",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Decimal { .. } => "decimal",
            Self::Json => "json",
            Self::Enum(_) => "enum",
            Self::Uuid => "uuid",
            Self::Char { .. } => "char",
            Self::String { .. } => "string",
            Self::Date => "date",
            Self::Time => "time",
            Self::Double => "double",
            Self::Float => "float",
            Self::Morphs => "morphs",
        }
    }

    /// `string('title', 100)`, without the `$table->` receiver.
    pub fn directive(&self, column: &str) -> String {
        let method = self.method();
        let column = php_string(column);
        match self {
            Self::Decimal { precision, scale } => {
                format!("{method}({column}, {precision}, {scale})")
            }
            Self::Char { length } | Self::String { length } if *length != DEFAULT_LENGTH => {
                format!("{method}({column}, {length})")
            }
            Self::Enum(values) => format!("{method}({column}, {})", php_list(values)),
            _ => format!("{method}({column})"),
        }
    }
}

/// Map a column type to its storage directive.
///
/// `schema_enum` is the enum definition the type name resolves to, which
/// takes precedence over everything else. Unknown names fall back to a
/// string column.
pub fn storage_type(typ: &ColumnType, schema_enum: Option<&EnumDefinition>) -> StorageType {
    if let Some(definition) = schema_enum {
        return StorageType::Enum(definition.value_names().map(str::to_string).collect());
    }

    match DeclaredType::classify(&typ.name) {
        DeclaredType::Integer => StorageType::Integer,
        DeclaredType::BigInteger => StorageType::BigInteger,
        DeclaredType::SmallInteger => StorageType::SmallInteger,
        DeclaredType::TinyInteger => StorageType::TinyInteger,
        DeclaredType::MediumInteger => StorageType::MediumInteger,
        DeclaredType::Text => StorageType::Text,
        DeclaredType::MediumText => StorageType::MediumText,
        DeclaredType::LongText => StorageType::LongText,
        DeclaredType::Boolean => StorageType::Boolean,
        DeclaredType::Timestamp => StorageType::Timestamp,
        DeclaredType::Decimal => StorageType::Decimal {
            precision: precision(typ),
            scale: scale(typ),
        },
        DeclaredType::Json => StorageType::Json,
        DeclaredType::Enum => StorageType::Enum(typ.args.clone()),
        DeclaredType::Uuid => StorageType::Uuid,
        DeclaredType::Char => StorageType::Char {
            length: length(typ),
        },
        DeclaredType::Date => StorageType::Date,
        DeclaredType::Time => StorageType::Time,
        DeclaredType::Double => StorageType::Double,
        DeclaredType::Float => StorageType::Float,
        DeclaredType::Morphs => StorageType::Morphs,
        DeclaredType::Varchar | DeclaredType::Unknown => StorageType::String {
            length: length(typ),
        },
    }
}

/// Auto-increment directive sized after the declared integer width.
pub fn increments_method(typ: &ColumnType) -> &'static str {
    match DeclaredType::classify(&typ.name) {
        DeclaredType::BigInteger => "bigIncrements",
        DeclaredType::SmallInteger => "smallIncrements",
        DeclaredType::TinyInteger => "tinyIncrements",
        DeclaredType::MediumInteger => "mediumIncrements",
        _ => "increments",
    }
}

/// Runtime cast hint for the model's cast map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Boolean,
    Float,
    Array,
    DateTime,
    Date,
    Integer,
    Decimal(u32),
}

impl CastType {
    pub fn as_cast(&self) -> String {
        match self {
            Self::Boolean => "boolean".to_string(),
            Self::Float => "float".to_string(),
            Self::Array => "array".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::Date => "date".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Decimal(scale) => format!("decimal:{scale}"),
        }
    }

    /// Casts the framework applies on its own and that are left out of the model.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Self::Integer)
    }
}

/// `None` for types that need no runtime coercion.
pub fn cast_type(typ: &ColumnType) -> Option<CastType> {
    match DeclaredType::classify(&typ.name) {
        DeclaredType::Boolean => Some(CastType::Boolean),
        DeclaredType::Decimal if typ.arg(1).is_some() => Some(CastType::Decimal(scale(typ))),
        DeclaredType::Decimal | DeclaredType::Float | DeclaredType::Double => Some(CastType::Float),
        DeclaredType::Json => Some(CastType::Array),
        DeclaredType::Timestamp => Some(CastType::DateTime),
        DeclaredType::Date => Some(CastType::Date),
        DeclaredType::Integer
        | DeclaredType::BigInteger
        | DeclaredType::SmallInteger
        | DeclaredType::TinyInteger
        | DeclaredType::MediumInteger => Some(CastType::Integer),
        _ => None,
    }
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    Cascade,
    Restrict,
    SetNull,
}

impl ForeignKeyAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "cascade" => Some(Self::Cascade),
            "restrict" => Some(Self::Restrict),
            "set null" => Some(Self::SetNull),
            _ => None,
        }
    }

    pub fn on_delete_suffix(self) -> &'static str {
        match self {
            Self::Cascade => "->cascadeOnDelete()",
            Self::Restrict => "->restrictOnDelete()",
            Self::SetNull => "->nullOnDelete()",
        }
    }

    pub fn on_update_suffix(self) -> &'static str {
        match self {
            Self::Cascade => "->cascadeOnUpdate()",
            Self::Restrict => "->restrictOnUpdate()",
            Self::SetNull => "->nullOnUpdate()",
        }
    }
}

pub fn length(typ: &ColumnType) -> u32 {
    numeric_arg(typ, 0, DEFAULT_LENGTH, 1)
}

pub fn precision(typ: &ColumnType) -> u32 {
    numeric_arg(typ, 0, DEFAULT_PRECISION, 1)
}

pub fn scale(typ: &ColumnType) -> u32 {
    numeric_arg(typ, 1, DEFAULT_SCALE, 0)
}

fn numeric_arg(typ: &ColumnType, position: usize, default: u32, min: u32) -> u32 {
    typ.arg(position)
        .and_then(|arg| arg.trim().parse::<i64>().ok())
        .map(|n| n.clamp(i64::from(min), i64::from(u32::MAX)) as u32)
        .unwrap_or(default)
}

/// Single-quoted PHP string literal.
pub fn php_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `['a', 'b']`
pub fn php_list<S: AsRef<str>>(values: &[S]) -> String {
    let items: Vec<String> = values.iter().map(|v| php_string(v.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumValue;

    const KNOWN_TYPES: &[&str] = &[
        "int", "integer", "bigint", "smallint", "tinyint", "mediumint", "text", "mediumtext",
        "longtext", "bool", "boolean", "timestamp", "datetime", "decimal", "numeric", "json",
        "jsonb", "enum", "uuid", "char", "varchar", "date", "time", "double", "float", "real",
        "morph",
    ];

    fn typ(name: &str, args: &[&str]) -> ColumnType {
        ColumnType::new(name).with_args(args.iter().copied())
    }

    #[test]
    fn test_storage_mapping_is_total() {
        for name in KNOWN_TYPES.iter().chain(["geometry", "", "VARCHAR(80)"].iter()) {
            let storage = storage_type(&typ(name, &[]), None);
            assert!(!storage.method().is_empty(), "{name}");
            assert!(storage.directive("col").starts_with(storage.method()), "{name}");
        }
        for name in KNOWN_TYPES {
            assert_ne!(DeclaredType::classify(name), DeclaredType::Unknown, "{name}");
        }
    }

    #[test]
    fn test_storage_directives() {
        assert_eq!(storage_type(&typ("INT", &[]), None).directive("age"), "integer('age')");
        assert_eq!(storage_type(&typ("bigint", &[]), None).directive("n"), "bigInteger('n')");
        assert_eq!(storage_type(&typ("varchar", &[]), None).directive("name"), "string('name')");
        assert_eq!(
            storage_type(&typ("varchar", &["100"]), None).directive("name"),
            "string('name', 100)"
        );
        assert_eq!(storage_type(&typ("char", &["2"]), None).directive("cc"), "char('cc', 2)");
        assert_eq!(storage_type(&typ("datetime", &[]), None).directive("at"), "timestamp('at')");
        assert_eq!(
            storage_type(&typ("enum", &["a", "b"]), None).directive("kind"),
            "enum('kind', ['a', 'b'])"
        );
    }

    #[test]
    fn test_unknown_type_falls_back_to_string() {
        assert_eq!(
            storage_type(&typ("geometry", &[]), None),
            StorageType::String {
                length: DEFAULT_LENGTH
            }
        );
    }

    #[test]
    fn test_decimal_args() {
        assert_eq!(
            storage_type(&typ("decimal", &[]), None).directive("price"),
            "decimal('price', 8, 2)"
        );
        assert_eq!(
            storage_type(&typ("decimal", &["10", "4"]), None).directive("price"),
            "decimal('price', 10, 4)"
        );
        assert_eq!(
            storage_type(&typ("decimal", &["abc", "-3"]), None),
            StorageType::Decimal {
                precision: DEFAULT_PRECISION,
                scale: 0
            }
        );
        assert_eq!(length(&typ("varchar", &["0"])), 1);
    }

    #[test]
    fn test_schema_enum_takes_precedence() {
        let definition = EnumDefinition {
            name: "user_status".into(),
            values: vec![
                EnumValue {
                    value: "active".into(),
                },
                EnumValue {
                    value: "inactive".into(),
                },
            ],
        };
        assert_eq!(
            storage_type(&typ("user_status", &[]), Some(&definition)).directive("status"),
            "enum('status', ['active', 'inactive'])"
        );
    }

    #[test]
    fn test_increments_sizes() {
        assert_eq!(increments_method(&typ("int", &[])), "increments");
        assert_eq!(increments_method(&typ("bigint", &[])), "bigIncrements");
        assert_eq!(increments_method(&typ("smallint", &[])), "smallIncrements");
    }

    #[test]
    fn test_cast_mapping() {
        let cast = |name: &str, args: &[&str]| cast_type(&typ(name, args)).map(|c| c.as_cast());

        assert_eq!(cast("bool", &[]).as_deref(), Some("boolean"));
        assert_eq!(cast("json", &[]).as_deref(), Some("array"));
        assert_eq!(cast("datetime", &[]).as_deref(), Some("datetime"));
        assert_eq!(cast("date", &[]).as_deref(), Some("date"));
        assert_eq!(cast("double", &[]).as_deref(), Some("float"));
        assert_eq!(cast("decimal", &[]).as_deref(), Some("float"));
        assert_eq!(cast("decimal", &["10", "3"]).as_deref(), Some("decimal:3"));
        assert_eq!(cast("varchar", &[]), None);
        assert_eq!(cast("user_status", &[]), None);
        assert!(cast_type(&typ("int", &[])).unwrap().is_trivial());
    }

    #[test]
    fn test_foreign_key_actions() {
        assert_eq!(ForeignKeyAction::parse("CASCADE"), Some(ForeignKeyAction::Cascade));
        assert_eq!(
            ForeignKeyAction::parse("set null").map(ForeignKeyAction::on_delete_suffix),
            Some("->nullOnDelete()")
        );
        assert_eq!(ForeignKeyAction::parse("no action"), None);
        assert_eq!(ForeignKeyAction::parse("set default"), None);
    }

    #[test]
    fn test_php_string_escaping() {
        assert_eq!(php_string("it's"), r"'it\'s'");
        assert_eq!(php_string(r"a\b"), r"'a\\b'");
    }
}
