use sql_crud_middleware::prelude::*;

fn mysql() -> StatementBuilder {
    StatementBuilder::new(Dialect::MySql)
}

#[test]
fn crud_statements_render_for_mysql() -> Result<(), Box<dyn std::error::Error>> {
    let builder = mysql();

    let insert = builder.insert(
        "users",
        &RowData::mapping([("name", RowValues::from("ann")), ("age", 30.into())]),
    )?;
    assert_eq!(insert.sql, "INSERT INTO `users` (`name`, `age`) VALUES (:name, :age)");
    assert_eq!(insert.params.get(":age"), Some(&RowValues::Int(30)));

    let find = builder.find_all(
        "users",
        &Conditions::new().eq("status", "active"),
        &FindOptions::new()
            .fields(Projection::columns(["id", "name"]))
            .order_by(OrderBy::desc("id"))
            .limit(10)
            .offset(20),
    )?;
    assert_eq!(
        find.sql,
        "SELECT `id`, `name` FROM `users` WHERE `status` = :status ORDER BY `id` DESC LIMIT 10 OFFSET 20"
    );

    let delete = builder.delete("users", &Conditions::new())?;
    assert_eq!(delete.sql, "DELETE FROM `users`");
    assert!(delete.params.is_empty());
    Ok(())
}

#[test]
fn update_keeps_set_and_where_values_apart() -> Result<(), Box<dyn std::error::Error>> {
    let stmt = mysql().update(
        "users",
        &RowData::mapping([("status", "archived")]),
        &Conditions::new().eq("status", "active"),
    )?;
    assert_eq!(stmt.params.get(":__set_status"), Some(&RowValues::from("archived")));
    assert_eq!(stmt.params.get(":__where_status"), Some(&RowValues::from("active")));
    Ok(())
}

#[test]
fn positional_placeholders_bind_in_text_order() -> Result<(), Box<dyn std::error::Error>> {
    let builder = mysql().with_placeholders(PlaceholderStyle::Positional);
    let stmt = builder.update(
        "users",
        &RowData::mapping([("name", "bob")]),
        &Conditions::new().eq("id", 7),
    )?;
    assert_eq!(stmt.sql, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
    let values: Vec<_> = stmt.params.values().cloned().collect();
    assert_eq!(values, [RowValues::from("bob"), RowValues::Int(7)]);
    Ok(())
}

#[test]
fn create_table_compiles_defaults_and_comments() -> Result<(), Box<dyn std::error::Error>> {
    let fields: Vec<FieldSpec> = vec![
        ColumnDef::new("id", "INT")
            .unsigned()
            .not_null()
            .auto_increment()
            .primary_key()
            .into(),
        ColumnDef::new("active", "TINYINT").size(1).default_value(true).into(),
        ColumnDef::new("created_at", "TIMESTAMP")
            .default_value("CURRENT_TIMESTAMP")
            .into(),
        ColumnDef::new("note", "VARCHAR")
            .size(255)
            .comment("user's note")
            .into(),
    ];
    let stmt = mysql().create_table("users", &fields, &TableOptions::default())?;
    assert_eq!(
        stmt.sql,
        "CREATE TABLE IF NOT EXISTS `users` (\
         `id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
         `active` TINYINT(1) DEFAULT 1, \
         `created_at` TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
         `note` VARCHAR(255) NULL COMMENT 'user''s note'\
         ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
    );
    Ok(())
}

#[test]
fn alter_and_describe_render_for_mysql() -> Result<(), Box<dyn std::error::Error>> {
    let stmt = mysql().alter_table(
        "users",
        &[
            AlterAction::add("email", "VARCHAR(128) NULL").after("name"),
            AlterAction::change("nick", "`nickname` VARCHAR(32)"),
            AlterAction::drop("legacy"),
        ],
    )?;
    assert_eq!(
        stmt.sql,
        "ALTER TABLE `users` ADD `email` VARCHAR(128) NULL AFTER `name`, \
         CHANGE `nick` `nickname` VARCHAR(32), DROP `legacy`"
    );
    assert_eq!(mysql().describe_table("users")?.sql, "DESCRIBE `users`");
    Ok(())
}

#[test]
fn validated_raw_clauses_reject_injection() {
    let builder = mysql().with_raw_clause_policy(RawClausePolicy::Validated);
    let ok = builder.find_all(
        "users",
        &Conditions::new(),
        &FindOptions::new().order_raw("name ASC, id DESC"),
    );
    assert!(ok.is_ok());

    let err = builder
        .find_all(
            "users",
            &Conditions::new(),
            &FindOptions::new().order_raw("id; DROP TABLE users"),
        )
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn hostile_identifiers_stay_quoted() -> Result<(), Box<dyn std::error::Error>> {
    let stmt = mysql().count("weird`table", &Conditions::new().eq("a b", 1))?;
    assert_eq!(
        stmt.sql,
        "SELECT COUNT(*) AS `count` FROM `weird``table` WHERE `a b` = :a_b"
    );
    Ok(())
}
