diesel::table! {
    email_opens (id) {
        id -> Integer,
        email -> Nullable<Text>,
        timestamp -> Timestamp,
    }
}
