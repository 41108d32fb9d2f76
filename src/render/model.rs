//! Eloquent model body.

use crate::mapping::types::php_string;
use crate::mapping::{Relation, cast_type, naming, relations};
use crate::schema::{Schema, Table};

use super::RenderError;
use super::template::{TemplateKind, TemplateLoader, fill, require};

/// Columns managed by the framework and never mass-assignable.
const MANAGED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Class names that collide with PHP keywords or reserved type names.
const RESERVED_CLASS_NAMES: &[&str] = &[
    "Abstract", "And", "Array", "As", "Bool", "Boolean", "Break", "Callable", "Case", "Catch",
    "Class", "Clone", "Const", "Continue", "Declare", "Default", "Do", "Echo", "Else", "Elseif",
    "Empty", "Enum", "Eval", "Exit", "Extends", "False", "Final", "Finally", "Float", "Fn", "For",
    "Foreach", "Function", "Global", "Goto", "If", "Implements", "Include", "Instanceof",
    "Insteadof", "Int", "Interface", "Isset", "Iterable", "List", "Match", "Mixed", "Namespace",
    "Never", "New", "Null", "Object", "Or", "Parent", "Print", "Private", "Protected", "Public",
    "Readonly", "Require", "Resource", "Return", "Self", "Static", "String", "Switch", "Throw",
    "Trait", "True", "Try", "Unset", "Use", "Var", "Void", "While", "Xor", "Yield",
];

const ITEM_SEPARATOR: &str = ",\n        ";
const METHOD_SEPARATOR: &str = "\n\n    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModel {
    pub class_name: String,
    pub contents: String,
}

/// Class name for `table`, refusing names the target language reserves.
pub fn class_name(table: &Table) -> Result<String, RenderError> {
    let name = naming::model_name(&table.name);
    if RESERVED_CLASS_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(&name))
    {
        return Err(RenderError::ReservedName {
            table: table.name.clone(),
            name,
        });
    }
    Ok(name)
}

pub fn render_model(
    table: &Table,
    schema: &Schema,
    templates: &dyn TemplateLoader,
) -> Result<RenderedModel, RenderError> {
    let class_name = class_name(table)?;
    let template = require(templates, TemplateKind::Model)?;

    let table_property = table_property(&table.name, &class_name);
    let fillable = fillable(table);
    let casts = casts(table);
    let relations = relations(table, schema)
        .iter()
        .map(relation_method)
        .collect::<Vec<_>>()
        .join(METHOD_SEPARATOR);

    let contents = fill(
        &template,
        &[
            ("modelName", &class_name),
            ("tableProperty", &table_property),
            ("fillable", &fillable),
            ("casts", &casts),
            ("relations", &relations),
        ],
    );

    Ok(RenderedModel {
        class_name,
        contents,
    })
}

/// `protected $table` line, only when the framework would infer another name.
pub fn table_property(table_name: &str, class_name: &str) -> String {
    if naming::conventional_table_name(class_name) == table_name {
        String::new()
    } else {
        format!("protected $table = {};{METHOD_SEPARATOR}", php_string(table_name))
    }
}

pub fn fillable(table: &Table) -> String {
    table
        .columns
        .iter()
        .filter(|c| !c.primary_key && !MANAGED_COLUMNS.contains(&c.name.as_str()))
        .map(|c| php_string(&c.name))
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR)
}

pub fn casts(table: &Table) -> String {
    table
        .columns
        .iter()
        .filter_map(|c| {
            let cast = cast_type(&c.typ).filter(|cast| !cast.is_trivial())?;
            Some(format!("{} => {}", php_string(&c.name), php_string(&cast.as_cast())))
        })
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR)
}

fn relation_method(relation: &Relation) -> String {
    let mut args = vec![
        format!("{}::class", relation.related_model),
        php_string(&relation.foreign_key),
    ];
    if let Some(key) = &relation.key {
        args.push(php_string(key));
    }

    format!(
        "public function {}()\n    {{\n        return $this->{}({});\n    }}",
        relation.method,
        relation.kind.builder_method(),
        args.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::template::PackagedTemplates;
    use crate::schema::{Column, ColumnReference, ColumnType, ReferenceTable};

    fn column(name: &str, typ: &str) -> Column {
        Column::new(name, ColumnType::new(typ))
    }

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            name: name.into(),
            schema: "public".into(),
            columns,
            indexes: vec![],
        }
    }

    #[test]
    fn test_fillable_skips_keys_and_timestamps() {
        let mut uuid = column("uuid", "uuid");
        uuid.primary_key = true;
        let users = table(
            "users",
            vec![
                column("id", "int"),
                uuid,
                column("name", "varchar"),
                column("created_at", "timestamp"),
                column("updated_at", "timestamp"),
                column("email", "varchar"),
            ],
        );
        assert_eq!(fillable(&users), "'name',\n        'email'");
    }

    #[test]
    fn test_casts_skip_trivial() {
        let posts = table(
            "posts",
            vec![
                column("id", "int"),
                column("title", "varchar"),
                column("published", "bool"),
                column("meta", "json"),
            ],
        );
        assert_eq!(
            casts(&posts),
            "'published' => 'boolean',\n        'meta' => 'array'"
        );
    }

    #[test]
    fn test_table_property() {
        assert_eq!(table_property("users", "User"), "");
        assert_eq!(table_property("blog_posts", "BlogPost"), "");
        assert_eq!(
            table_property("tbl_user", "TblUser"),
            "protected $table = 'tbl_user';\n\n    "
        );
        assert!(!table_property("User", "User").is_empty());
    }

    #[test]
    fn test_reserved_class_name() {
        let classes = table("classes", vec![column("id", "int")]);
        let err = render_model(&classes, &Schema::default(), &PackagedTemplates).unwrap_err();
        match err {
            RenderError::ReservedName { table, name } => {
                assert_eq!(table, "classes");
                assert_eq!(name, "Class");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_belongs_to() {
        let mut user_id = column("user_id", "int");
        user_id.references.push(ColumnReference {
            target_table: ReferenceTable {
                table: "users".into(),
                schema: None,
            },
            target_column: Some("id".into()),
            on_delete: None,
            on_update: None,
        });
        let posts = table("posts", vec![column("id", "int"), user_id]);
        let schema = Schema {
            tables: vec![posts.clone()],
            enums: Default::default(),
        };

        let model = render_model(&posts, &schema, &PackagedTemplates).unwrap();
        assert_eq!(model.class_name, "Post");
        assert!(model.contents.contains("class Post extends Model"));
        assert!(model.contents.contains("public function user()"));
        assert!(model.contents.contains("return $this->belongsTo(User::class, 'user_id');"));
        assert!(!model.contents.contains("protected $table"));
    }
}
