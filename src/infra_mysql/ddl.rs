use super::util::{quote_ident, quote_text};
use crate::domain_model::*;

fn column_definition(column: &ColumnSpec) -> String {
    let mut sql = format!("{} {}", quote_ident(&column.name), column.column_type);
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        match default {
            DefaultValue::Null => sql.push_str("NULL"),
            DefaultValue::Number(n) => sql.push_str(n),
            DefaultValue::Text(t) => sql.push_str(&quote_text(t)),
            DefaultValue::Expression(e) => sql.push_str(e),
        }
    }
    if let Some(comment) = &column.comment {
        sql.push_str(" COMMENT ");
        sql.push_str(&quote_text(comment));
    }
    match &column.position {
        ColumnPosition::Last => {}
        ColumnPosition::First => sql.push_str(" FIRST"),
        ColumnPosition::After(other) => {
            sql.push_str(" AFTER ");
            sql.push_str(&quote_ident(other));
        }
    }
    sql
}

fn index_definition(index: &IndexSpec) -> String {
    let parts = index
        .parts
        .iter()
        .map(|part| match part.prefix_len {
            Some(len) => format!("{}({})", quote_ident(&part.column), len),
            None => quote_ident(&part.column),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let unique = if index.unique { "UNIQUE " } else { "" };
    format!("{}INDEX {} ({})", unique, quote_ident(&index.name), parts)
}

/// Single `ALTER TABLE` statement that applies the change.
pub fn alter_statement(descriptor: &SchemaChangeDescriptor) -> String {
    let action = match &descriptor.change {
        SchemaChange::AddColumn(column) => format!("ADD COLUMN {}", column_definition(column)),
        SchemaChange::AddIndex(index) => format!("ADD {}", index_definition(index)),
    };
    format!("ALTER TABLE {} {}", quote_ident(&descriptor.target_table), action)
}

/// Single `ALTER TABLE` statement that undoes the change.
pub fn revert_statement(descriptor: &SchemaChangeDescriptor) -> String {
    let action = match &descriptor.change {
        SchemaChange::AddColumn(column) => format!("DROP COLUMN {}", quote_ident(&column.name)),
        SchemaChange::AddIndex(index) => format!("DROP INDEX {}", quote_ident(&index.name)),
    };
    format!("ALTER TABLE {} {}", quote_ident(&descriptor.target_table), action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_add_column() {
        let d = SchemaChangeDescriptor::add_column(
            "deliverables",
            "share_enabled TINYINT default 1".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(
            alter_statement(&d),
            "ALTER TABLE `deliverables` ADD COLUMN `share_enabled` TINYINT DEFAULT 1"
        );
        assert_eq!(
            revert_statement(&d),
            "ALTER TABLE `deliverables` DROP COLUMN `share_enabled`"
        );
    }

    #[test]
    fn renders_positioned_not_null_column() {
        let d = SchemaChangeDescriptor::add_column(
            "customer_files",
            "folder_path varchar(255) NOT NULL DEFAULT '' AFTER category"
                .parse()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            alter_statement(&d),
            "ALTER TABLE `customer_files` ADD COLUMN `folder_path` varchar(255) NOT NULL DEFAULT '' AFTER `category`"
        );
    }

    #[test]
    fn renders_comment_before_position() {
        let d = SchemaChangeDescriptor::add_column(
            "commission_rule_sets",
            "currency VARCHAR(10) DEFAULT 'CNY' COMMENT 'rule''s currency' AFTER include_prepay"
                .parse()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            alter_statement(&d),
            "ALTER TABLE `commission_rule_sets` ADD COLUMN `currency` VARCHAR(10) DEFAULT 'CNY' COMMENT 'rule''s currency' AFTER `include_prepay`"
        );
    }

    #[test]
    fn renders_prefix_index() {
        let index = IndexSpec::new(
            "idx_customer_folder",
            vec![
                IndexPart::column("customer_id").unwrap(),
                IndexPart::prefix("folder_path", 120).unwrap(),
            ],
        )
        .unwrap();
        let d = SchemaChangeDescriptor::add_index("customer_files", index).unwrap();
        assert_eq!(
            alter_statement(&d),
            "ALTER TABLE `customer_files` ADD INDEX `idx_customer_folder` (`customer_id`, `folder_path`(120))"
        );
        assert_eq!(
            revert_statement(&d),
            "ALTER TABLE `customer_files` DROP INDEX `idx_customer_folder`"
        );
    }

    #[test]
    fn renders_unique_index() {
        let index = IndexSpec::new("uniq_token", vec![IndexPart::column("token").unwrap()])
            .unwrap()
            .unique();
        let d = SchemaChangeDescriptor::add_index("desktop_tokens", index).unwrap();
        assert_eq!(
            alter_statement(&d),
            "ALTER TABLE `desktop_tokens` ADD UNIQUE INDEX `uniq_token` (`token`)"
        );
    }
}
