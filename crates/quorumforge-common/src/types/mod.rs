pub mod alias_table;
