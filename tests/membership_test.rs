//! Membership relation behavior: duplicate grants, role independence, and
//! bulk removal scope.

use org_directory::models::MembershipType;
use org_directory::store::MembershipStore;

mod common;

#[tokio::test]
async fn test_double_add_leaves_exactly_one_row() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let account = common::insert_account(store.pool(), "alice").await;

    assert!(store
        .add_user_member(common::TENANT, group, account)
        .await
        .unwrap());
    // Second identical grant reports failure, not an error
    assert!(!store
        .add_user_member(common::TENANT, group, account)
        .await
        .unwrap());

    assert_eq!(common::count_membership_rows(store.pool(), group).await, 1);
}

#[tokio::test]
async fn test_user_and_admin_roles_are_independent_rows() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let account = common::insert_account(store.pool(), "alice").await;

    assert!(store
        .add_user_member(common::TENANT, group, account)
        .await
        .unwrap());
    assert!(store
        .add_admin_member(common::TENANT, group, account)
        .await
        .unwrap());
    assert_eq!(common::count_membership_rows(store.pool(), group).await, 2);

    assert!(store
        .is_user_member(common::TENANT, group, account)
        .await
        .unwrap());
    assert!(store
        .is_admin_member(common::TENANT, group, account)
        .await
        .unwrap());

    // Removing the ordinary membership leaves the admin row intact
    store
        .remove_member(common::TENANT, group, account)
        .await
        .unwrap();

    assert!(!store
        .is_user_member(common::TENANT, group, account)
        .await
        .unwrap());
    assert!(store
        .is_admin_member(common::TENANT, group, account)
        .await
        .unwrap());
    assert_eq!(common::count_membership_rows(store.pool(), group).await, 1);
}

#[tokio::test]
async fn test_remove_member_of_absent_row_is_success() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let account = common::insert_account(store.pool(), "alice").await;

    // Nothing to delete; still succeeds
    store
        .remove_member(common::TENANT, group, account)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_all_members_scoped_to_group() {
    let store = common::setup_test_store().await;
    let finance = common::insert_group(&store, "finance", "Finance").await;
    let hr = common::insert_group(&store, "hr", "HR").await;
    let alice = common::insert_account(store.pool(), "alice").await;
    let bob = common::insert_account(store.pool(), "bob").await;

    store
        .add_user_member(common::TENANT, finance, alice)
        .await
        .unwrap();
    store
        .add_admin_member(common::TENANT, finance, alice)
        .await
        .unwrap();
    store
        .add_user_member(common::TENANT, finance, bob)
        .await
        .unwrap();
    store
        .add_user_member(common::TENANT, hr, bob)
        .await
        .unwrap();

    store
        .remove_all_members_of_group(common::TENANT, finance)
        .await
        .unwrap();

    assert_eq!(common::count_membership_rows(store.pool(), finance).await, 0);
    // Other groups keep their rows
    assert_eq!(common::count_membership_rows(store.pool(), hr).await, 1);

    // Idempotent
    store
        .remove_all_members_of_group(common::TENANT, finance)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_is_member_exact_triple() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let alice = common::insert_account(store.pool(), "alice").await;
    let bob = common::insert_account(store.pool(), "bob").await;

    store
        .add_admin_member(common::TENANT, group, alice)
        .await
        .unwrap();

    assert!(store
        .is_member(common::TENANT, group, alice, MembershipType::GroupAdmin)
        .await
        .unwrap());
    assert!(!store
        .is_member(common::TENANT, group, alice, MembershipType::GroupUser)
        .await
        .unwrap());
    assert!(!store
        .is_member(common::TENANT, group, bob, MembershipType::GroupAdmin)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_add_member_requires_existing_group_and_account() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let account = common::insert_account(store.pool(), "alice").await;

    let err = store
        .add_user_member(common::TENANT, group, account + 100)
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());

    let err = store
        .add_user_member(common::TENANT, group + 100, account)
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn test_list_members_deduplicates_by_account() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let alice = common::insert_account(store.pool(), "alice").await;

    store
        .add_user_member(common::TENANT, group, alice)
        .await
        .unwrap();
    store
        .add_admin_member(common::TENANT, group, alice)
        .await
        .unwrap();

    let members = store
        .list_members_of_group(common::TENANT, group, &MembershipType::ALL)
        .await
        .unwrap();
    // Two relation rows, one person
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "alice");
}

#[tokio::test]
async fn test_list_members_with_empty_role_set() {
    let store = common::setup_test_store().await;
    let group = common::insert_group(&store, "finance", "Finance").await;
    let alice = common::insert_account(store.pool(), "alice").await;
    store
        .add_user_member(common::TENANT, group, alice)
        .await
        .unwrap();

    let members = store
        .list_members_of_group(common::TENANT, group, &[])
        .await
        .unwrap();
    assert!(members.is_empty());
}
