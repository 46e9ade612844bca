table! {
    indices (id) {
        id -> Integer,
        name -> Text,
        display_name -> Text,
        category -> Text,
        original_filename -> Text,
        upload_date -> Timestamp,
        file_size_kb -> Double,
        record_count -> Integer,
    }
}

table! {
    stocks (id) {
        id -> Integer,
        ticker -> Text,
    }
}

table! {
    index_constituents (index_id, stock_id) {
        index_id -> Integer,
        stock_id -> Integer,
    }
}

table! {
    name_mappings (id) {
        id -> Integer,
        source_name -> Text,
        index_id -> Integer,
        inferred -> Bool,
        updated_at -> Timestamp,
    }
}

joinable!(index_constituents -> indices (index_id));
joinable!(index_constituents -> stocks (stock_id));
joinable!(name_mappings -> indices (index_id));

allow_tables_to_appear_in_same_query!(indices, stocks, index_constituents, name_mappings,);
