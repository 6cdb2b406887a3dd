use super::*;
use crate::change::{
    AclChange, Change, ChangeOperation, ChangeScope, PublicationChange, TableChange,
};
use crate::model::*;

fn ctx() -> DiffContext {
    DiffContext::default()
}

fn column(name: &str, position: i32, data_type: &str) -> Column {
    Column {
        name: name.into(),
        position,
        data_type: data_type.into(),
        type_schema: None,
        not_null: false,
        identity: ColumnIdentity::None,
        generated: ColumnGenerated::None,
        default: None,
        collation: None,
        comment: None,
    }
}

fn table(schema: &str, name: &str, columns: Vec<Column>) -> Table {
    Table {
        schema: schema.into(),
        name: name.into(),
        owner: "postgres".into(),
        columns,
        partition_by: None,
        rls_enabled: false,
        replica_identity: ReplicaIdentity::Default,
        options: vec![],
        comment: None,
        privileges: vec![],
    }
}

fn snapshot_with_table(t: Table) -> SchemaSnapshot {
    let mut snapshot = SchemaSnapshot::new();
    snapshot.add_table(t);
    snapshot
}

#[test]
fn test_identical_snapshots_produce_no_changes() {
    let mut snapshot = SchemaSnapshot::new();
    snapshot.add_table(table("app", "users", vec![column("id", 1, "bigint")]));
    snapshot.add_sequence(Sequence {
        schema: "app".into(),
        name: "users_id_seq".into(),
        owner: "postgres".into(),
        data_type: "bigint".into(),
        start: 1,
        min_value: 1,
        max_value: i64::MAX,
        increment: 1,
        cycle: false,
        cache: 1,
        owned_by: None,
        comment: None,
        privileges: vec![],
    });

    let changes = compute_schema_diff(&ctx(), &snapshot, &snapshot.clone());
    assert!(changes.is_empty());
}

#[test]
fn test_create_table() {
    let main = SchemaSnapshot::new();
    let branch = snapshot_with_table(table("app", "users", vec![column("id", 1, "bigint")]));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 1);
    assert!(matches!(&changes[0], Change::Table(TableChange::Create { .. })));
}

#[test]
fn test_drop_table() {
    let main = snapshot_with_table(table("app", "users", vec![column("id", 1, "bigint")]));
    let branch = SchemaSnapshot::new();

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 1);
    assert!(matches!(&changes[0], Change::Table(TableChange::Drop { .. })));
}

#[test]
fn test_create_path_ordering() {
    // Object first, then owner, comment, privileges
    let mut t = table("app", "users", vec![column("id", 1, "bigint")]);
    t.owner = "app_owner".into();
    t.comment = Some("user accounts".into());
    t.privileges = vec![AclEntry {
        grantee: "reporting".into(),
        privilege: "SELECT".into(),
        grantable: false,
    }];
    let branch = snapshot_with_table(t);

    let changes = compute_schema_diff(&ctx(), &SchemaSnapshot::new(), &branch);
    let scopes: Vec<(ChangeOperation, ChangeScope)> =
        changes.iter().map(|c| (c.operation(), c.scope())).collect();
    assert_eq!(
        scopes,
        vec![
            (ChangeOperation::Create, ChangeScope::Object),
            (ChangeOperation::Alter, ChangeScope::Object),
            (ChangeOperation::Create, ChangeScope::Comment),
            (ChangeOperation::Create, ChangeScope::Acl),
        ]
    );
}

#[test]
fn test_add_column() {
    let main = snapshot_with_table(table("app", "users", vec![column("id", 1, "bigint")]));
    let branch = snapshot_with_table(table(
        "app",
        "users",
        vec![column("id", 1, "bigint"), column("email", 2, "text")],
    ));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 1);
    match &changes[0] {
        Change::Table(TableChange::AddColumn { column, .. }) => {
            assert_eq!(column.name, "email");
        }
        other => panic!("expected AddColumn, got {other:?}"),
    }
}

#[test]
fn test_column_order_is_ignored() {
    let main = snapshot_with_table(table(
        "app",
        "users",
        vec![column("id", 1, "bigint"), column("email", 2, "text")],
    ));
    let branch = snapshot_with_table(table(
        "app",
        "users",
        vec![column("email", 1, "text"), column("id", 2, "bigint")],
    ));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert!(changes.is_empty(), "renumbered columns are not a change: {changes:?}");
}

#[test]
fn test_set_not_null() {
    let main = snapshot_with_table(table("app", "users", vec![column("email", 1, "text")]));
    let mut wanted = column("email", 1, "text");
    wanted.not_null = true;
    let branch = snapshot_with_table(table("app", "users", vec![wanted]));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 1);
    match &changes[0] {
        Change::Table(TableChange::AlterColumn { alteration, .. }) => {
            assert!(matches!(alteration, crate::change::ColumnAlteration::SetNotNull));
        }
        other => panic!("expected AlterColumn, got {other:?}"),
    }
}

#[test]
fn test_generated_change_recreates_column() {
    let main = snapshot_with_table(table("app", "users", vec![column("full_name", 1, "text")]));
    let mut generated = column("full_name", 1, "text");
    generated.generated = ColumnGenerated::Stored;
    generated.default = Some("first || ' ' || last".into());
    let branch = snapshot_with_table(table("app", "users", vec![generated]));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 2);
    assert!(matches!(&changes[0], Change::Table(TableChange::DropColumn { .. })));
    assert!(matches!(&changes[1], Change::Table(TableChange::AddColumn { .. })));
}

#[test]
fn test_partitioning_change_recreates_table() {
    let main = snapshot_with_table(table("app", "events", vec![column("id", 1, "bigint")]));
    let mut partitioned = table("app", "events", vec![column("id", 1, "bigint")]);
    partitioned.partition_by = Some("RANGE (id)".into());
    let branch = snapshot_with_table(partitioned);

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert!(matches!(&changes[0], Change::Table(TableChange::Drop { .. })));
    assert!(matches!(&changes[1], Change::Table(TableChange::Create { .. })));
}

#[test]
fn test_rls_and_replica_identity_are_separate_alters() {
    let main = snapshot_with_table(table("app", "users", vec![column("id", 1, "bigint")]));
    let mut changed = table("app", "users", vec![column("id", 1, "bigint")]);
    changed.rls_enabled = true;
    changed.replica_identity = ReplicaIdentity::Full;
    let branch = snapshot_with_table(changed);

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().any(|c| matches!(
        c,
        Change::Table(TableChange::SetRowLevelSecurity { enabled: true, .. })
    )));
    assert!(changes.iter().any(|c| matches!(
        c,
        Change::Table(TableChange::SetReplicaIdentity { .. })
    )));
}

#[test]
fn test_comment_transitions() {
    let base = table("app", "users", vec![column("id", 1, "bigint")]);
    let mut with_comment = base.clone();
    with_comment.comment = Some("accounts".into());

    // set
    let changes = compute_schema_diff(
        &ctx(),
        &snapshot_with_table(base.clone()),
        &snapshot_with_table(with_comment.clone()),
    );
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].operation(), ChangeOperation::Create);
    assert_eq!(changes[0].scope(), ChangeScope::Comment);

    // unset
    let changes = compute_schema_diff(
        &ctx(),
        &snapshot_with_table(with_comment.clone()),
        &snapshot_with_table(base),
    );
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].operation(), ChangeOperation::Drop);

    // replace
    let mut replaced = with_comment.clone();
    replaced.comment = Some("all accounts".into());
    let changes = compute_schema_diff(
        &ctx(),
        &snapshot_with_table(with_comment),
        &snapshot_with_table(replaced),
    );
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].operation(), ChangeOperation::Create);
    assert!(changes[0].to_sql().contains("'all accounts'"));
}

#[test]
fn test_privilege_grantable_flips() {
    let target = crate::change::SqlObjectRef::Table {
        schema: "app".into(),
        name: "users".into(),
    };
    let plain = |grantable| AclEntry {
        grantee: "reporting".into(),
        privilege: "SELECT".into(),
        grantable,
    };

    // false -> true: fresh grant with the option
    let changes = acl_diff(&target, &[plain(false)], &[plain(true)]);
    assert_eq!(changes.len(), 1);
    match &changes[0] {
        Change::Acl(AclChange::Grant { grantable, .. }) => assert!(grantable),
        other => panic!("expected Grant, got {other:?}"),
    }

    // true -> false: revoke only the option
    let changes = acl_diff(&target, &[plain(true)], &[plain(false)]);
    assert_eq!(changes.len(), 1);
    assert!(matches!(
        &changes[0],
        Change::Acl(AclChange::RevokeGrantOption { .. })
    ));

    // removal: full revoke
    let changes = acl_diff(&target, &[plain(false)], &[]);
    assert_eq!(changes.len(), 1);
    assert!(matches!(&changes[0], Change::Acl(AclChange::Revoke { .. })));
}

#[test]
fn test_publication_all_tables_flip_recreates() {
    let mut main = SchemaSnapshot::new();
    main.add_publication(Publication {
        name: "events".into(),
        owner: "postgres".into(),
        all_tables: true,
        publish_insert: true,
        publish_update: true,
        publish_delete: true,
        publish_truncate: true,
        publish_via_partition_root: false,
        tables: vec![],
        schemas: vec![],
        comment: None,
    });
    let mut branch = SchemaSnapshot::new();
    branch.add_publication(Publication {
        name: "events".into(),
        owner: "postgres".into(),
        all_tables: false,
        publish_insert: true,
        publish_update: true,
        publish_delete: true,
        publish_truncate: true,
        publish_via_partition_root: false,
        tables: vec![PublicationTable {
            schema: "app".into(),
            name: "events".into(),
            columns: None,
            row_filter: None,
        }],
        schemas: vec![],
        comment: None,
    });

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert!(matches!(
        &changes[0],
        Change::Publication(PublicationChange::Drop { .. })
    ));
    assert!(matches!(
        &changes[1],
        Change::Publication(PublicationChange::Create { .. })
    ));
}

#[test]
fn test_publication_table_filter_change_replaces_entry() {
    let publication = |filter: Option<&str>| Publication {
        name: "events".into(),
        owner: "postgres".into(),
        all_tables: false,
        publish_insert: true,
        publish_update: true,
        publish_delete: true,
        publish_truncate: true,
        publish_via_partition_root: false,
        tables: vec![PublicationTable {
            schema: "app".into(),
            name: "events".into(),
            columns: None,
            row_filter: filter.map(String::from),
        }],
        schemas: vec![],
        comment: None,
    };
    let mut main = SchemaSnapshot::new();
    main.add_publication(publication(None));
    let mut branch = SchemaSnapshot::new();
    branch.add_publication(publication(Some("kind <> 'debug'")));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 2);
    assert!(matches!(
        &changes[0],
        Change::Publication(PublicationChange::DropTables { .. })
    ));
    assert!(matches!(
        &changes[1],
        Change::Publication(PublicationChange::AddTables { .. })
    ));
}

#[test]
fn test_subscription_two_phase_recreates() {
    let subscription = |two_phase| Subscription {
        name: "replica".into(),
        owner: "postgres".into(),
        connection: "host=primary".into(),
        publications: vec!["events".into()],
        enabled: true,
        slot_name: None,
        synchronous_commit: None,
        binary: false,
        streaming: false,
        two_phase,
        disable_on_error: false,
        comment: None,
    };
    let mut main = SchemaSnapshot::new();
    main.add_subscription(subscription(false));
    let mut branch = SchemaSnapshot::new();
    branch.add_subscription(subscription(true));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert!(matches!(
        &changes[0],
        Change::Subscription(crate::change::SubscriptionChange::Drop { .. })
    ));
    assert!(matches!(
        &changes[1],
        Change::Subscription(crate::change::SubscriptionChange::Create { .. })
    ));
}

#[test]
fn test_aggregate_return_type_change_recreates() {
    let aggregate = |return_type: &str| Aggregate {
        schema: "app".into(),
        name: "total".into(),
        identity_arguments: "numeric".into(),
        argument_types: vec!["numeric".into()],
        return_type: return_type.into(),
        transition_function: "app.total_step".into(),
        state_data_type: "numeric".into(),
        final_function: None,
        final_modify: None,
        combine_function: None,
        serial_function: None,
        deserial_function: None,
        moving_transition_function: None,
        moving_inverse_function: None,
        moving_state_data_type: None,
        moving_final_function: None,
        sort_operator: None,
        initial_condition: None,
        moving_initial_condition: None,
        parallel: ParallelSafety::Unsafe,
        kind: AggregateKind::Normal,
        owner: "postgres".into(),
        comment: None,
        privileges: vec![],
    };
    let mut main = SchemaSnapshot::new();
    main.add_aggregate(aggregate("numeric"));
    let mut branch = SchemaSnapshot::new();
    branch.add_aggregate(aggregate("double precision"));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert!(matches!(
        &changes[0],
        Change::Aggregate(crate::change::AggregateChange::Drop { .. })
    ));
    assert!(matches!(
        &changes[1],
        Change::Aggregate(crate::change::AggregateChange::Create { .. })
    ));
}

#[test]
fn test_enum_append_is_alterable() {
    let enum_type = |labels: &[&str]| TypeDef {
        schema: "app".into(),
        name: "status".into(),
        owner: "postgres".into(),
        comment: None,
        variant: TypeVariant::Enum {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        },
    };
    let mut main = SchemaSnapshot::new();
    main.add_type(enum_type(&["new", "active"]));
    let mut branch = SchemaSnapshot::new();
    branch.add_type(enum_type(&["new", "active", "closed"]));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 1);
    assert!(matches!(
        &changes[0],
        Change::Type(crate::change::TypeChange::AddEnumLabel { value, .. }) if value == "closed"
    ));

    // Reordering labels cannot be altered in place
    let mut reordered = SchemaSnapshot::new();
    reordered.add_type(enum_type(&["active", "new"]));
    let mut main = SchemaSnapshot::new();
    main.add_type(enum_type(&["new", "active"]));
    let changes = compute_schema_diff(&ctx(), &main, &reordered);
    assert_eq!(changes.len(), 2);
    assert!(matches!(&changes[0], Change::Type(crate::change::TypeChange::Drop { .. })));
}

#[test]
fn test_view_definition_change_recreates() {
    let view = |definition: &str| View {
        schema: "app".into(),
        name: "totals".into(),
        owner: "postgres".into(),
        definition: definition.into(),
        options: vec![],
        check_option: None,
        comment: None,
        privileges: vec![],
    };
    let mut main = SchemaSnapshot::new();
    main.add_view(view("SELECT 1"));
    let mut branch = SchemaSnapshot::new();
    branch.add_view(view("SELECT 2"));

    let changes = compute_schema_diff(&ctx(), &main, &branch);
    assert_eq!(changes.len(), 2);
    assert!(matches!(&changes[0], Change::View(crate::change::ViewChange::Drop { .. })));
    assert!(matches!(
        &changes[1],
        Change::View(crate::change::ViewChange::Create { .. })
    ));
}

#[test]
fn test_table_drop_cascades_skip_dependents() {
    let mut main = snapshot_with_table(table("app", "users", vec![column("id", 1, "bigint")]));
    main.add_index(Index {
        schema: "app".into(),
        name: "users_pkey_idx".into(),
        table: "users".into(),
        definition: "CREATE UNIQUE INDEX users_pkey_idx ON app.users (id)".into(),
        comment: None,
    });
    main.add_policy(Policy {
        schema: "app".into(),
        table: "users".into(),
        name: "self_read".into(),
        command: "SELECT".into(),
        permissive: true,
        roles: vec![],
        using_expr: Some("true".into()),
        check_expr: None,
        comment: None,
    });

    let changes = compute_schema_diff(&ctx(), &main, &SchemaSnapshot::new());
    // Only the table drop; the index and policy ride along with it
    assert_eq!(changes.len(), 1);
    assert!(matches!(&changes[0], Change::Table(TableChange::Drop { .. })));
}

#[test]
fn test_diff_is_deterministic() {
    let mut main = SchemaSnapshot::new();
    let mut branch = SchemaSnapshot::new();
    for name in ["zeta", "alpha", "mid"] {
        branch.add_table(table("app", name, vec![column("id", 1, "bigint")]));
        main.add_table(table("app", name, vec![]));
    }
    branch.add_schema(SchemaDef {
        name: "app".into(),
        owner: "postgres".into(),
        comment: None,
        privileges: vec![],
    });

    let first = compute_schema_diff(&ctx(), &main, &branch);
    let second = compute_schema_diff(&ctx(), &main, &branch);
    let first_sql: Vec<String> = first.iter().map(Change::to_sql).collect();
    let second_sql: Vec<String> = second.iter().map(Change::to_sql).collect();
    assert_eq!(first_sql, second_sql);
}

#[test]
fn test_empty_to_snapshot_provides_every_target_id() {
    // Round-trip conservation: creating from nothing must provide the
    // target's ids (owned subordinates included)
    let mut branch = SchemaSnapshot::new();
    branch.add_schema(SchemaDef {
        name: "app".into(),
        owner: "postgres".into(),
        comment: None,
        privileges: vec![],
    });
    branch.add_table(table(
        "app",
        "users",
        vec![column("id", 1, "bigint"), column("email", 2, "text")],
    ));
    branch.add_index(Index {
        schema: "app".into(),
        name: "users_email_idx".into(),
        table: "users".into(),
        definition: "CREATE UNIQUE INDEX users_email_idx ON app.users (email)".into(),
        comment: None,
    });

    let changes = compute_schema_diff(&ctx(), &SchemaSnapshot::new(), &branch);
    let provided: std::collections::BTreeSet<_> =
        changes.iter().flat_map(|c| c.provides()).collect();
    for id in branch.stable_ids() {
        assert!(provided.contains(&id), "{id} is not provided by any change");
    }
}
