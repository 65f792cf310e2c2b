mod store;

use ledger_store::Memory;

#[tokio::test]
async fn save() {
    store::test_save(&Memory::store()).await.unwrap();
}

#[tokio::test]
async fn wrong_version() {
    store::test_wrong_version(&Memory::store()).await.unwrap();
}

#[tokio::test]
async fn concurrency() {
    store::test_concurrency(&Memory::store()).await.unwrap();
}

#[tokio::test]
async fn read_all() {
    store::test_read_all(&Memory::store()).await.unwrap();
}

#[tokio::test]
async fn insert_and_last() {
    store::test_insert_and_last(&Memory::store()).await.unwrap();
}
