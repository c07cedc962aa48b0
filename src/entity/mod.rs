pub mod addresses;
pub mod audit_logs;
pub mod categories;
pub mod items;
pub mod order_items;
pub mod orders;
pub mod profiles;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use items::Entity as Items;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use profiles::Entity as Profiles;
pub use users::Entity as Users;
