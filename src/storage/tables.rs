use redb::TableDefinition;

/// Asset records: uuid -> AssetRecord (msgpack)
pub const ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("assets");

/// Asset id index: "{customer}-{n}" -> uuid. Doubles as the uniqueness constraint.
pub const ASSET_IDS: TableDefinition<&str, &str> = TableDefinition::new("asset_ids");

/// Customer index: customer_id -> msgpack Vec of asset UUIDs
pub const CUSTOMER_ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("customer_assets");

/// Advisory next-number counters: customer code -> CustomerAssetCounter (msgpack)
pub const ASSET_COUNTERS: TableDefinition<&str, &[u8]> = TableDefinition::new("asset_counters");

/// Test history rows: uuid -> TestHistoryEntry (msgpack)
pub const TEST_HISTORY: TableDefinition<&str, &[u8]> = TableDefinition::new("test_history");

/// History index: asset uuid -> msgpack Vec of history UUIDs, in append order
pub const ASSET_TESTS: TableDefinition<&str, &[u8]> = TableDefinition::new("asset_tests");

/// Certificate reports: uuid -> CertificateReport (msgpack)
pub const REPORTS: TableDefinition<&str, &[u8]> = TableDefinition::new("reports");
