use redb::TableDefinition;

/// Flat key-value space: opaque key bytes -> opaque value bytes
pub const KV: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");
