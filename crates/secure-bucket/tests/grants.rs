use secure_bucket::grantee::GROUP_TAG_KEY;
use secure_bucket::region::StackEnv;
use secure_bucket::{AccessLevel, AccessSpec, ActionCatalog, BucketProps, Environment, Principals, SecureResourcePolicyBuilder, Stack};

use bucket_policy::{Effect, Principal, Statement};

use std::sync::Once;

const BUCKET_ARN: &str = "arn:aws:s3:::scenario-bucket";

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

fn derive(access: &AccessSpec, principals: &Principals) -> Vec<Statement> {
    SecureResourcePolicyBuilder::statements(access, principals, BUCKET_ARN)
}

#[test]
fn read_only_role_scenario() {
    setup_tracing();

    let stmts = derive(&AccessSpec::level(AccessLevel::ReadOnly), &Principals::role("arn:role/analyst"));
    let [stmt] = stmts.as_slice() else {
        panic!("expected exactly one statement, got {}", stmts.len());
    };

    assert_eq!(stmt.effect(), Effect::Allow);
    assert_eq!(stmt.actions(), ["s3:GetObject", "s3:ListBucket", "s3:GetBucketLocation"]);
    assert_eq!(stmt.principal(), Some(&Principal::Aws("arn:role/analyst".to_owned())));
    assert_eq!(stmt.condition(), None);
}

#[test]
fn data_processing_group_scenario() {
    setup_tracing();

    let stmts = derive(&AccessSpec::level(AccessLevel::DataProcessing), &Principals::group("developer"));
    let [stmt] = stmts.as_slice() else {
        panic!("expected exactly one statement, got {}", stmts.len());
    };

    assert_eq!(stmt.actions(), ActionCatalog::resolve(AccessLevel::DataProcessing));
    assert!(stmt.actions().iter().any(|a| a.ends_with("Tagging")));
    assert_eq!(stmt.principal(), Some(&Principal::Service("iam.amazonaws.com".to_owned())));

    let json = serde_json::to_value(stmt).unwrap();
    assert_eq!(
        json["Condition"],
        serde_json::json!({ "StringEquals": { "aws:PrincipalTag/aws:iam:groupName": "developer" } })
    );
}

#[test]
fn custom_actions_win_scenario() {
    setup_tracing();

    let access = AccessSpec::level(AccessLevel::FullAccess).with_custom(["get-object"]);
    let stmts = derive(&access, &Principals::role("X"));
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].actions(), ["get-object"]);
}

#[test]
fn empty_access_scenario() {
    setup_tracing();

    assert!(derive(&AccessSpec::default(), &Principals::role("X")).is_empty());
    assert!(derive(&AccessSpec::default(), &Principals::role("X").with_group("g")).is_empty());
    assert!(derive(&AccessSpec::custom(Vec::<String>::new()), &Principals::group("g")).is_empty());
}

#[test]
fn empty_principal_identifiers_grant_nothing() {
    setup_tracing();

    assert!(derive(&AccessSpec::level(AccessLevel::ReadOnly), &Principals::role("")).is_empty());
    assert!(derive(&AccessSpec::level(AccessLevel::ReadOnly), &Principals::role("").with_group("")).is_empty());

    let stmts = derive(&AccessSpec::level(AccessLevel::ReadOnly), &Principals::role("arn:role/a").with_group(""));
    let [stmt] = stmts.as_slice() else {
        panic!("expected exactly one statement, got {}", stmts.len());
    };
    assert_eq!(stmt.principal(), Some(&Principal::Aws("arn:role/a".to_owned())));
}

#[test]
fn custom_overrides_every_level() {
    for level in AccessLevel::ALL {
        let access = AccessSpec::level(level).with_custom(["s3:GetObjectVersion", "s3:GetObject"]);
        for stmt in derive(&access, &Principals::role("r").with_group("g")) {
            assert_eq!(stmt.actions(), ["s3:GetObjectVersion", "s3:GetObject"], "{level}");
        }
    }
}

#[test]
fn every_statement_is_scoped_to_bucket_and_objects() {
    let principal_sets = [
        Principals::role("arn:role/a"),
        Principals::group("team"),
        Principals::role("arn:role/a").with_group("team"),
    ];
    for level in AccessLevel::ALL {
        for principals in &principal_sets {
            for stmt in derive(&AccessSpec::level(level), principals) {
                assert_eq!(stmt.resources(), [BUCKET_ARN.to_owned(), format!("{BUCKET_ARN}/*")]);
            }
        }
    }
}

#[test]
fn group_condition_matches_exactly() {
    for name in ["developer", "Developer", "dev*", "data engineers"] {
        let stmts = derive(&AccessSpec::level(AccessLevel::ReadWrite), &Principals::group(name));
        let condition = stmts[0].condition().unwrap();
        assert_eq!(condition.get("StringEquals", GROUP_TAG_KEY), Some(name));
        assert_eq!(condition.iter().count(), 1);
    }
}

#[test]
fn derivation_is_idempotent() {
    let access = AccessSpec::level(AccessLevel::DataProcessing);
    let principals = Principals::role("arn:role/etl").with_group("developer");

    let first = derive(&access, &principals);
    let second = derive(&access, &principals);
    assert_eq!(first, second);
    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
}

#[test]
fn both_principals_share_one_operation_set() {
    let stmts = derive(&AccessSpec::level(AccessLevel::FullAccess), &Principals::role("arn:role/etl").with_group("ops"));
    assert_eq!(stmts.len(), 2);
    assert!(matches!(stmts[0].principal(), Some(Principal::Aws(_))));
    assert!(matches!(stmts[1].principal(), Some(Principal::Service(_))));
    assert_eq!(stmts[0].actions(), stmts[1].actions());
}

#[test]
fn stack_synth_is_byte_identical() {
    setup_tracing();

    let build = || {
        let mut stack = Stack::new("Grants", StackEnv::new("123456789012", "eu-central-1").unwrap());
        let props = BucketProps {
            bucket_name: Some("grants-data".to_owned()),
            environment: Environment::production(),
            access: AccessSpec::level(AccessLevel::ReadWrite),
            principals: Principals::role("arn:aws:iam::123456789012:role/writer").with_group("developer"),
            auto_delete_objects: false,
        };
        stack.add_bucket("Data", &props).unwrap();
        stack.synth().unwrap().to_json_pretty().unwrap()
    };

    assert_eq!(build(), build());
}
