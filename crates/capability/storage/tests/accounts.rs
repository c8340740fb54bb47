use fleet_storage::{
    CustomerRecord, CustomerStore, DealerRecord, DealerStore, InMemoryCustomerStore,
    InMemoryDealerStore, InMemoryUserStore, UserRecord, UserStore,
};

fn user(user_id: &str, username: &str) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        username: username.to_string(),
        password: "hash".to_string(),
        role: "Admin".to_string(),
        customer_code: None,
        assigned_vehicles: Vec::new(),
        linked_id: None,
    }
}

#[tokio::test]
async fn save_user_rejects_duplicate_username() {
    let store = InMemoryUserStore::new();
    store.save_user(user("u1", "alice")).await.expect("save");
    assert!(store.save_user(user("u2", "alice")).await.is_err());

    let mut renamed = user("u1", "alice2");
    renamed.linked_id = Some("cust-1".to_string());
    store.save_user(renamed).await.expect("replace");

    assert!(store.find_by_username("alice").await.expect("find").is_none());
    let linked = store
        .find_by_linked_id("cust-1")
        .await
        .expect("find")
        .expect("linked");
    assert_eq!(linked.username, "alice2");
    assert_eq!(store.list_users().await.expect("list").len(), 1);
}

#[tokio::test]
async fn delete_by_linked_id_removes_only_linked_login() {
    let store = InMemoryUserStore::new();
    let mut linked = user("u1", "acme");
    linked.linked_id = Some("cust-1".to_string());
    store.save_user(linked).await.expect("save");
    store.save_user(user("u2", "admin")).await.expect("save");

    assert!(store.delete_by_linked_id("cust-1").await.expect("delete"));
    assert!(!store.delete_by_linked_id("cust-1").await.expect("delete again"));
    assert!(store.find_by_username("acme").await.expect("find").is_none());
    assert!(store.find_by_username("admin").await.expect("find").is_some());
}

#[tokio::test]
async fn password_hash_update() {
    let store = InMemoryUserStore::new();
    store.save_user(user("u1", "admin")).await.expect("save");
    assert!(store.update_password_hash("u1", "$argon2id$x").await.expect("update"));
    assert!(!store.update_password_hash("u9", "x").await.expect("update"));

    let found = store.find_by_username("admin").await.expect("find").expect("user");
    assert_eq!(found.password, "$argon2id$x");
    assert_eq!(found.to_principal().username, "admin");
}

#[tokio::test]
async fn customers_and_dealers_save_by_id() {
    let customers = InMemoryCustomerStore::new();
    let record = CustomerRecord {
        customer_id: "c1".to_string(),
        customer_code: "B".to_string(),
        customer_name: "Beta".to_string(),
        ..CustomerRecord::default()
    };
    customers.save_customer(record.clone()).await.expect("save");
    customers
        .save_customer(CustomerRecord {
            customer_id: "c2".to_string(),
            customer_code: "A".to_string(),
            ..CustomerRecord::default()
        })
        .await
        .expect("save");
    customers
        .save_customer(CustomerRecord {
            customer_name: "Beta Ltd".to_string(),
            ..record
        })
        .await
        .expect("replace");

    let list = customers.list_customers().await.expect("list");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].customer_code, "A");
    let found = customers.find_customer("c1").await.expect("find").expect("customer");
    assert_eq!(found.customer_name, "Beta Ltd");

    let dealers = InMemoryDealerStore::new();
    dealers
        .save_dealer(DealerRecord {
            dealer_id: "d1".to_string(),
            dealer_code: "D-1".to_string(),
            ..DealerRecord::default()
        })
        .await
        .expect("save");
    assert_eq!(dealers.list_dealers().await.expect("list").len(), 1);
    assert!(dealers.find_dealer("d2").await.expect("find").is_none());
}
