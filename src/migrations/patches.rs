use crate::application_port::Migration;
use crate::domain_model::*;

pub fn deliverables_share_enabled() -> Result<Migration, DefinitionError> {
    Ok(Migration {
        name: "deliverables_share_enabled",
        changes: vec![SchemaChangeDescriptor::add_column(
            "deliverables",
            "share_enabled TINYINT default 1".parse()?,
        )?],
    })
}

pub fn finance_manual_status() -> Result<Migration, DefinitionError> {
    let mut changes = Vec::new();
    for table in ["finance_installments", "finance_contracts"] {
        changes.push(SchemaChangeDescriptor::add_column(
            table,
            "manual_status varchar(20) DEFAULT NULL AFTER status".parse()?,
        )?);
        changes.push(SchemaChangeDescriptor::add_index(
            table,
            IndexSpec::new("idx_manual_status", vec![IndexPart::column("manual_status")?])?,
        )?);
    }
    Ok(Migration {
        name: "finance_manual_status",
        changes,
    })
}

pub fn customer_files_folder_path() -> Result<Migration, DefinitionError> {
    Ok(Migration {
        name: "customer_files_folder_path",
        changes: vec![
            SchemaChangeDescriptor::add_column(
                "customer_files",
                ColumnSpec::new("folder_path", "varchar(255)")?
                    .not_null()
                    .default_value(DefaultValue::Text(String::new()))
                    .after("category")?,
            )?,
            SchemaChangeDescriptor::add_index(
                "customer_files",
                IndexSpec::new(
                    "idx_customer_folder",
                    vec![
                        IndexPart::column("customer_id")?,
                        IndexPart::prefix("folder_path", 120)?,
                    ],
                )?,
            )?,
        ],
    })
}

pub fn finance_receipts_multi_currency() -> Result<Migration, DefinitionError> {
    let columns = [
        "currency VARCHAR(3) DEFAULT 'TWD' COMMENT '货币代码'",
        "exchange_rate_floating DECIMAL(12,6) DEFAULT NULL COMMENT '当时浮动汇率'",
        "exchange_rate_fixed DECIMAL(12,6) DEFAULT NULL COMMENT '当时固定汇率'",
        "amount_cny DECIMAL(12,2) DEFAULT NULL COMMENT '折算人民币金额'",
    ];
    let changes: Vec<SchemaChangeDescriptor> = columns
        .into_iter()
        .map(|column| SchemaChangeDescriptor::add_column("finance_receipts", column.parse()?))
        .collect::<Result<_, DefinitionError>>()?;
    Ok(Migration {
        name: "finance_receipts_multi_currency",
        changes,
    })
}

pub fn commission_rule_sets_currency() -> Result<Migration, DefinitionError> {
    Ok(Migration {
        name: "commission_rule_sets_currency",
        changes: vec![SchemaChangeDescriptor::add_column(
            "commission_rule_sets",
            "currency VARCHAR(10) DEFAULT 'CNY' COMMENT '货币类型' AFTER include_prepay".parse()?,
        )?],
    })
}

/// Settlement source tracking on receipts: each column with its own index.
pub fn finance_receipts_settlement_source() -> Result<Migration, DefinitionError> {
    let columns = [
        (
            "sales_user_id_snapshot int DEFAULT NULL AFTER installment_id",
            "idx_sales_user_id_snapshot",
        ),
        (
            "source_type varchar(30) DEFAULT NULL AFTER sales_user_id_snapshot",
            "idx_source_type",
        ),
        (
            "source_id bigint UNSIGNED DEFAULT NULL AFTER source_type",
            "idx_source_id",
        ),
    ];
    let mut changes = Vec::new();
    for (definition, index) in columns {
        let column: ColumnSpec = definition.parse()?;
        let part = IndexPart::column(column.name.as_str())?;
        changes.push(SchemaChangeDescriptor::add_column("finance_receipts", column)?);
        changes.push(SchemaChangeDescriptor::add_index(
            "finance_receipts",
            IndexSpec::new(index, vec![part])?,
        )?);
    }
    Ok(Migration {
        name: "finance_receipts_settlement_source",
        changes,
    })
}

pub fn customers_group_code() -> Result<Migration, DefinitionError> {
    Ok(Migration {
        name: "customers_group_code",
        changes: vec![
            SchemaChangeDescriptor::add_column(
                "customers",
                "group_code VARCHAR(20) DEFAULT NULL COMMENT '群码（不可变唯一标识，格式 QYYYYMMDDNN）' AFTER customer_code"
                    .parse()?,
            )?,
            SchemaChangeDescriptor::add_index(
                "customers",
                IndexSpec::new("uniq_group_code", vec![IndexPart::column("group_code")?])?.unique(),
            )?,
        ],
    })
}

pub fn builtin() -> Result<Vec<Migration>, DefinitionError> {
    Ok(vec![
        deliverables_share_enabled()?,
        finance_manual_status()?,
        customer_files_folder_path()?,
        finance_receipts_multi_currency()?,
        commission_rule_sets_currency()?,
        finance_receipts_settlement_source()?,
        customers_group_code()?,
    ])
}
