//! Preset resource catalogue.
//!
//! Standard data entities of a finance and operations environment that
//! users commonly export. Every name is a public entity set.

/// One preset entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Entity set name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Functional area.
    pub category: &'static str,
}

const fn preset(name: &'static str, description: &'static str, category: &'static str) -> Preset {
    Preset {
        name,
        description,
        category,
    }
}

/// The preset catalogue, grouped by area.
pub static PRESETS: &[Preset] = &[
    // Organization
    preset("LegalEntities", "Legal entities (companies)", "Organization"),
    preset("OperatingUnits", "Operating units", "Organization"),
    // Finance
    preset("MainAccounts", "Chart of accounts main accounts", "Finance"),
    preset("LedgerJournalHeaders", "General journal headers", "Finance"),
    preset("CurrencyExchangeRates", "Currency exchange rates", "Finance"),
    preset("PaymentTerms", "Terms of payment", "Finance"),
    // Customers
    preset("CustomersV3", "Customers", "Sales"),
    preset("CustomerGroups", "Customer groups", "Sales"),
    preset("SalesOrderHeadersV2", "Sales order headers", "Sales"),
    preset("SalesOrderLines", "Sales order lines", "Sales"),
    preset("SalesInvoiceHeaders", "Posted sales invoice headers", "Sales"),
    // Vendors
    preset("VendorsV2", "Vendors", "Procurement"),
    preset("VendorGroups", "Vendor groups", "Procurement"),
    preset("PurchaseOrderHeadersV2", "Purchase order headers", "Procurement"),
    preset("PurchaseOrderLinesV2", "Purchase order lines", "Procurement"),
    preset("VendorInvoiceHeaders", "Vendor invoice headers", "Procurement"),
    // Products
    preset("ReleasedProductsV2", "Released products", "Products"),
    preset("ProductCategories", "Product categories", "Products"),
    preset("Warehouses", "Warehouses", "Inventory"),
    preset("InventorySitesV2", "Inventory sites", "Inventory"),
    // People
    preset("Workers", "Workers", "Human resources"),
    preset("Employees", "Employees", "Human resources"),
];

/// Looks up a preset by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Preset names in catalogue order.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}
