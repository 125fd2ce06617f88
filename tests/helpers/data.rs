use minidb::types::{Row, Value};

#[allow(dead_code)]
pub fn letters_sql() -> Vec<String> {
    let mut stmts = vec!["CREATE TABLE t (id INT, name TEXT)".to_string()];
    for (id, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")] {
        stmts.push(format!("INSERT INTO t VALUES ({id}, '{name}')"));
    }
    stmts
}

#[allow(dead_code)]
pub fn users_sql() -> Vec<String> {
    let mut stmts = vec!["CREATE TABLE users (id INT, name TEXT, city TEXT)".to_string()];
    for (id, name, city) in [
        (1, "Alice", "Oslo"),
        (2, "Bob", "Rome"),
        (3, "Carol", "Oslo"),
        (4, "Dave", "Lima"),
    ] {
        stmts.push(format!("INSERT INTO users VALUES ({id}, '{name}', '{city}')"));
    }
    stmts
}

#[allow(dead_code)]
pub fn row(id: i64, text: &[&str]) -> Row {
    std::iter::once(Value::Int64(id))
        .chain(text.iter().map(|s| Value::from(*s)))
        .collect()
}
