use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::{AllergenCrossReactivity, CrossReactivityGroup};

fn create_group_table() -> TableCreateStatement {
    Table::create()
        .table(CrossReactivityGroup::Table)
        .col(
            ColumnDef::new(CrossReactivityGroup::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(CrossReactivityGroup::Name).string().not_null())
        .col(
            ColumnDef::new(CrossReactivityGroup::ProteinFamily)
                .string()
                .null(),
        )
        .to_owned()
}

fn drop_group_table() -> TableDropStatement {
    Table::drop().table(CrossReactivityGroup::Table).to_owned()
}

/// Allergen ids are not foreign keys: the engine tolerates groups naming
/// allergens the catalog does not describe.
fn create_membership_table() -> TableCreateStatement {
    Table::create()
        .table(AllergenCrossReactivity::Table)
        .col(
            ColumnDef::new(AllergenCrossReactivity::GroupId)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(AllergenCrossReactivity::AllergenId)
                .string()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(AllergenCrossReactivity::GroupId)
                .col(AllergenCrossReactivity::AllergenId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_allergen_cross_reactivity_group")
                .from(
                    AllergenCrossReactivity::Table,
                    AllergenCrossReactivity::GroupId,
                )
                .to(CrossReactivityGroup::Table, CrossReactivityGroup::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_membership_table() -> TableDropStatement {
    Table::drop()
        .table(AllergenCrossReactivity::Table)
        .to_owned()
}

sqlite_operation!(CreateGroupTable, create_group_table(), drop_group_table());
sqlite_operation!(
    CreateMembershipTable,
    create_membership_table(),
    drop_membership_table()
);
