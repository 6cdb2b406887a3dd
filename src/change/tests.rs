use super::*;
use crate::ident::StableId;
use crate::model::*;

fn users_table() -> Table {
    Table {
        schema: "app".into(),
        name: "users".into(),
        owner: "app_owner".into(),
        columns: vec![
            Column {
                name: "id".into(),
                position: 1,
                data_type: "bigint".into(),
                type_schema: None,
                not_null: true,
                identity: ColumnIdentity::Always,
                generated: ColumnGenerated::None,
                default: None,
                collation: None,
                comment: None,
            },
            Column {
                name: "email".into(),
                position: 2,
                data_type: "text".into(),
                type_schema: None,
                not_null: true,
                identity: ColumnIdentity::None,
                generated: ColumnGenerated::None,
                default: Some("''".into()),
                collation: None,
                comment: None,
            },
        ],
        partition_by: None,
        rls_enabled: false,
        replica_identity: ReplicaIdentity::Default,
        options: vec![],
        comment: None,
        privileges: vec![],
    }
}

#[test]
fn test_create_table_sql() {
    let change = TableChange::Create { table: users_table() };
    assert_eq!(
        change.to_sql(),
        "CREATE TABLE app.users (\n    \
         id bigint GENERATED ALWAYS AS IDENTITY NOT NULL,\n    \
         email text DEFAULT '' NOT NULL\n)"
    );
}

#[test]
fn test_create_table_provides_columns() {
    let change = TableChange::Create { table: users_table() };
    let provides = change.provides();
    assert!(provides.contains(&StableId::table("app", "users")));
    assert!(provides.contains(&StableId::column("app", "users", "id")));
    assert!(provides.contains(&StableId::column("app", "users", "email")));
    assert_eq!(change.requires(), vec![StableId::schema("app")]);
}

#[test]
fn test_drop_table_drops_column_ids() {
    let change = TableChange::Drop {
        schema: "app".into(),
        name: "users".into(),
        columns: vec!["id".into(), "email".into()],
    };
    assert_eq!(change.to_sql(), "DROP TABLE app.users");
    assert_eq!(change.drops().len(), 3);
    assert!(change.provides().is_empty());
}

#[test]
fn test_quoted_identifiers_in_sql() {
    let change = TableChange::AddColumn {
        schema: "app".into(),
        table: "Orders".into(),
        column: Column {
            name: "user id".into(),
            position: 3,
            data_type: "bigint".into(),
            type_schema: None,
            not_null: false,
            identity: ColumnIdentity::None,
            generated: ColumnGenerated::None,
            default: None,
            collation: None,
            comment: None,
        },
    };
    assert_eq!(
        change.to_sql(),
        "ALTER TABLE app.\"Orders\" ADD COLUMN \"user id\" bigint"
    );
}

#[test]
fn test_constraint_add_sql() {
    let change = ConstraintChange::Add {
        constraint: Constraint {
            schema: "app".into(),
            table: "orders".into(),
            name: "orders_user_fk".into(),
            kind: ConstraintKind::ForeignKey,
            definition: "FOREIGN KEY (user_id) REFERENCES app.users(id)".into(),
            referenced_table: Some(("app".into(), "users".into())),
            comment: None,
        },
    };
    assert_eq!(
        change.to_sql(),
        "ALTER TABLE app.orders ADD CONSTRAINT orders_user_fk \
         FOREIGN KEY (user_id) REFERENCES app.users(id)"
    );
    // The referenced table never appears in requires; the applier's rounds
    // absorb FK ordering
    assert_eq!(change.requires(), vec![StableId::table("app", "orders")]);
}

#[test]
fn test_comment_change_sql() {
    let set = CommentChange {
        target: SqlObjectRef::Table {
            schema: "app".into(),
            name: "users".into(),
        },
        comment: Some("it's the user table".into()),
    };
    assert_eq!(
        set.to_sql(),
        "COMMENT ON TABLE app.users IS 'it''s the user table'"
    );
    assert_eq!(set.operation(), ChangeOperation::Create);
    assert_eq!(
        set.provides(),
        vec![StableId::comment_on(&StableId::table("app", "users"))]
    );

    let unset = CommentChange {
        target: SqlObjectRef::Column {
            schema: "app".into(),
            table: "users".into(),
            name: "email".into(),
        },
        comment: None,
    };
    assert_eq!(unset.to_sql(), "COMMENT ON COLUMN app.users.email IS NULL");
    assert_eq!(unset.operation(), ChangeOperation::Drop);
    assert!(!unset.drops().is_empty());
}

#[test]
fn test_acl_grant_sql() {
    let target = SqlObjectRef::Table {
        schema: "app".into(),
        name: "users".into(),
    };
    let grant = AclChange::Grant {
        target: target.clone(),
        grantee: "reporting".into(),
        privileges: vec!["INSERT".into(), "SELECT".into()],
        grantable: true,
    };
    assert_eq!(
        grant.to_sql(),
        "GRANT INSERT, SELECT ON TABLE app.users TO reporting WITH GRANT OPTION"
    );

    let revoke = AclChange::RevokeGrantOption {
        target,
        grantee: "PUBLIC".into(),
        privileges: vec!["SELECT".into()],
    };
    assert_eq!(
        revoke.to_sql(),
        "REVOKE GRANT OPTION FOR SELECT ON TABLE app.users FROM PUBLIC"
    );
    // Keeps the base privilege, so it drops nothing
    assert!(revoke.drops().is_empty());
}

#[test]
fn test_grant_on_foreign_server_phrase() {
    let grant = AclChange::Grant {
        target: SqlObjectRef::Server { name: "files".into() },
        grantee: "etl".into(),
        privileges: vec!["USAGE".into()],
        grantable: false,
    };
    assert_eq!(grant.to_sql(), "GRANT USAGE ON FOREIGN SERVER files TO etl");
}

#[test]
fn test_sequence_create_omits_default_clauses() {
    let change = SequenceChange::Create {
        sequence: Sequence {
            schema: "app".into(),
            name: "users_id_seq".into(),
            owner: "postgres".into(),
            data_type: "bigint".into(),
            start: 1,
            min_value: 1,
            max_value: 9223372036854775807,
            increment: 1,
            cycle: false,
            cache: 1,
            owned_by: None,
            comment: None,
            privileges: vec![],
        },
    };
    let sql = change.to_sql();
    assert!(!sql.contains(" AS bigint"));
    assert!(!sql.contains("NO CYCLE"));
    assert!(sql.starts_with("CREATE SEQUENCE app.users_id_seq"));
}

#[test]
fn test_sequence_set_options_only_changed() {
    let change = SequenceChange::SetOptions {
        schema: "app".into(),
        name: "users_id_seq".into(),
        options: SequenceOptions {
            increment: Some(10),
            cycle: Some(true),
            ..SequenceOptions::default()
        },
    };
    assert_eq!(
        change.to_sql(),
        "ALTER SEQUENCE app.users_id_seq INCREMENT BY 10 CYCLE"
    );
}

#[test]
fn test_routine_create_normalizes_head() {
    let routine = Routine {
        schema: "app".into(),
        name: "add".into(),
        kind: RoutineKind::Function,
        identity_arguments: "integer, integer".into(),
        return_type: Some("integer".into()),
        language: "sql".into(),
        volatility: Volatility::Immutable,
        security_definer: false,
        parallel: ParallelSafety::Safe,
        strict: false,
        leakproof: false,
        definition: "CREATE FUNCTION app.add(a integer, b integer) RETURNS integer\n    \
                     LANGUAGE sql IMMUTABLE PARALLEL SAFE\n    AS $$ SELECT a + b $$"
            .into(),
        argument_types: vec!["integer".into(), "integer".into()],
        owner: "postgres".into(),
        comment: None,
        privileges: vec![],
    };
    let replace = RoutineChange::Create {
        routine: routine.clone(),
        or_replace: true,
    };
    assert!(replace.to_sql().starts_with("CREATE OR REPLACE FUNCTION app.add"));

    let fresh = RoutineChange::Create {
        routine,
        or_replace: false,
    };
    assert!(fresh.to_sql().starts_with("CREATE FUNCTION app.add"));
}

#[test]
fn test_routine_drop_sql() {
    let change = RoutineChange::Drop {
        schema: "app".into(),
        name: "add".into(),
        arguments: "integer, integer".into(),
        kind: RoutineKind::Function,
    };
    assert_eq!(change.to_sql(), "DROP FUNCTION app.add(integer, integer)");
    assert_eq!(
        change.drops(),
        vec![StableId::function("app", "add", "integer, integer")]
    );
}

#[test]
fn test_aggregate_create_omits_read_only_modify() {
    let aggregate = Aggregate {
        schema: "app".into(),
        name: "sum_squares".into(),
        identity_arguments: "double precision".into(),
        argument_types: vec!["double precision".into()],
        return_type: "double precision".into(),
        transition_function: "app.sum_squares_step".into(),
        state_data_type: "double precision".into(),
        final_function: None,
        final_modify: Some('r'),
        combine_function: None,
        serial_function: None,
        deserial_function: None,
        moving_transition_function: None,
        moving_inverse_function: None,
        moving_state_data_type: None,
        moving_final_function: None,
        sort_operator: None,
        initial_condition: Some("0".into()),
        moving_initial_condition: None,
        parallel: ParallelSafety::Safe,
        kind: AggregateKind::Normal,
        owner: "postgres".into(),
        comment: None,
        privileges: vec![],
    };
    let sql = AggregateChange::Create { aggregate }.to_sql();
    assert!(sql.contains("SFUNC = app.sum_squares_step"));
    assert!(sql.contains("INITCOND = '0'"));
    assert!(sql.contains("PARALLEL = SAFE"));
    assert!(!sql.contains("FINALFUNC_MODIFY"));
}

#[test]
fn test_enum_type_sql() {
    let change = TypeChange::Create {
        type_def: TypeDef {
            schema: "app".into(),
            name: "status".into(),
            owner: "postgres".into(),
            comment: None,
            variant: TypeVariant::Enum {
                labels: vec!["new".into(), "active".into(), "closed".into()],
            },
        },
    };
    assert_eq!(
        change.to_sql(),
        "CREATE TYPE app.status AS ENUM ('new', 'active', 'closed')"
    );

    let add = TypeChange::AddEnumLabel {
        schema: "app".into(),
        name: "status".into(),
        value: "archived".into(),
    };
    assert_eq!(add.to_sql(), "ALTER TYPE app.status ADD VALUE 'archived'");
}

#[test]
fn test_publication_create_sql() {
    let change = PublicationChange::Create {
        publication: Publication {
            name: "events".into(),
            owner: "postgres".into(),
            all_tables: false,
            publish_insert: true,
            publish_update: true,
            publish_delete: false,
            publish_truncate: false,
            publish_via_partition_root: false,
            tables: vec![PublicationTable {
                schema: "app".into(),
                name: "events".into(),
                columns: None,
                row_filter: Some("kind <> 'debug'".into()),
            }],
            schemas: vec![],
            comment: None,
        },
    };
    assert_eq!(
        change.to_sql(),
        "CREATE PUBLICATION events FOR TABLE app.events WHERE (kind <> 'debug') \
         WITH (publish = 'insert, update')"
    );
}

#[test]
fn test_subscription_create_sql() {
    let change = SubscriptionChange::Create {
        subscription: Subscription {
            name: "replica".into(),
            owner: "postgres".into(),
            connection: "host=primary dbname=app".into(),
            publications: vec!["events".into()],
            enabled: false,
            slot_name: None,
            synchronous_commit: None,
            binary: false,
            streaming: false,
            two_phase: true,
            disable_on_error: false,
            comment: None,
        },
    };
    assert_eq!(
        change.to_sql(),
        "CREATE SUBSCRIPTION replica CONNECTION 'host=primary dbname=app' \
         PUBLICATION events WITH (enabled = false, two_phase = true)"
    );
}

#[test]
fn test_default_acl_sql() {
    let change = DefaultAclChange::Grant {
        role: "app_owner".into(),
        schema: Some("app".into()),
        objects: DefaultAclObjects::Tables,
        grantee: "reporting".into(),
        privileges: vec!["SELECT".into()],
        grantable: false,
    };
    assert_eq!(
        change.to_sql(),
        "ALTER DEFAULT PRIVILEGES FOR ROLE app_owner IN SCHEMA app \
         GRANT SELECT ON TABLES TO reporting"
    );
}

#[test]
fn test_serialize_is_deterministic() {
    let a = TableChange::Create { table: users_table() };
    let b = TableChange::Create { table: users_table() };
    assert_eq!(a.to_sql(), b.to_sql());
}

#[test]
fn test_change_payload_roundtrips_through_json() {
    let change: Change = TableChange::Create { table: users_table() }.into();
    let json = serde_json::to_string(&change).unwrap();
    let back: Change = serde_json::from_str(&json).unwrap();
    assert_eq!(change, back);
    assert_eq!(change.to_sql(), back.to_sql());
}

#[test]
fn test_provides_and_drops_disjoint() {
    let changes: Vec<Change> = vec![
        TableChange::Create { table: users_table() }.into(),
        TableChange::Drop {
            schema: "app".into(),
            name: "old".into(),
            columns: vec!["id".into()],
        }
        .into(),
        SchemaChange::Create { name: "app".into() }.into(),
    ];
    for change in changes {
        let provides = change.provides();
        for dropped in change.drops() {
            assert!(!provides.contains(&dropped), "{dropped} both provided and dropped");
        }
    }
}
