use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_account_tables::Migration),
            Box::new(m20240115_000002_create_rbac_tables::Migration),
            Box::new(m20240115_000003_create_catalog_tables::Migration),
            Box::new(m20240115_000004_create_order_tables::Migration),
            Box::new(m20240115_000005_create_email_configs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240115_000001_create_account_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000001_create_account_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Admins::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Admins::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Admins::Name).string().not_null())
                        .col(
                            ColumnDef::new(Admins::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Admins::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Admins::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Admins::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Admins::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Suppliers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::CompanyName).string().null())
                        .col(ColumnDef::new(Suppliers::GstNumber).string().null())
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Suppliers::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Dropshippers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Dropshippers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Dropshippers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Dropshippers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Dropshippers::PasswordHash)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Dropshippers::Phone).string().null())
                        .col(ColumnDef::new(Dropshippers::StoreName).string().null())
                        .col(ColumnDef::new(Dropshippers::Website).string().null())
                        .col(
                            ColumnDef::new(Dropshippers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Dropshippers::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Dropshippers::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Dropshippers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Dropshippers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Admins::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Admins {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Phone,
        CompanyName,
        GstNumber,
        IsActive,
        IsVerified,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Dropshippers {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Phone,
        StoreName,
        Website,
        IsActive,
        IsVerified,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000002_create_rbac_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000002_create_rbac_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Roles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Roles::Panel).string().not_null())
                        .col(ColumnDef::new(Roles::Name).string().not_null())
                        .col(
                            ColumnDef::new(Roles::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Roles::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Roles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Permissions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Permissions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Permissions::Module).string().not_null())
                        .col(ColumnDef::new(Permissions::Action).string().not_null())
                        .col(ColumnDef::new(Permissions::Description).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_permissions_module_action")
                        .table(Permissions::Table)
                        .col(Permissions::Module)
                        .col(Permissions::Action)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RolePermissions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RolePermissions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RolePermissions::RoleId).uuid().not_null())
                        .col(
                            ColumnDef::new(RolePermissions::PermissionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RolePermissions::Allowed)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_role_permissions_role_permission")
                        .table(RolePermissions::Table)
                        .col(RolePermissions::RoleId)
                        .col(RolePermissions::PermissionId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Staff::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Staff::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Staff::Panel).string().not_null())
                        .col(ColumnDef::new(Staff::ParentId).uuid().not_null())
                        .col(ColumnDef::new(Staff::RoleId).uuid().not_null())
                        .col(ColumnDef::new(Staff::Name).string().not_null())
                        .col(
                            ColumnDef::new(Staff::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Staff::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Staff::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Staff::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Staff::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_staff_parent_id")
                        .table(Staff::Table)
                        .col(Staff::ParentId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Staff::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Permissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Roles {
        Table,
        Id,
        Panel,
        Name,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Permissions {
        Table,
        Id,
        Module,
        Action,
        Description,
    }

    #[derive(DeriveIden)]
    enum RolePermissions {
        Table,
        Id,
        RoleId,
        PermissionId,
        Allowed,
    }

    #[derive(DeriveIden)]
    enum Staff {
        Table,
        Id,
        Panel,
        ParentId,
        RoleId,
        Name,
        Email,
        PasswordHash,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000003_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000003_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(ColumnDef::new(Products::Price).decimal().not_null())
                        .col(ColumnDef::new(Products::CostPrice).decimal().not_null())
                        .col(ColumnDef::new(Products::WeightGrams).integer().null())
                        .col(ColumnDef::new(Products::ImagePath).string().null())
                        .col(
                            ColumnDef::new(Products::IsPublished)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_supplier_sku")
                        .table(Products::Table)
                        .col(Products::SupplierId)
                        .col(Products::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(ColumnDef::new(Warehouses::ContactName).string().null())
                        .col(ColumnDef::new(Warehouses::Phone).string().null())
                        .col(ColumnDef::new(Warehouses::AddressLine1).string().not_null())
                        .col(ColumnDef::new(Warehouses::AddressLine2).string().null())
                        .col(ColumnDef::new(Warehouses::City).string().not_null())
                        .col(ColumnDef::new(Warehouses::State).string().not_null())
                        .col(ColumnDef::new(Warehouses::PostalCode).string().not_null())
                        .col(
                            ColumnDef::new(Warehouses::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_warehouses_supplier_id")
                        .table(Warehouses::Table)
                        .col(Warehouses::SupplierId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        SupplierId,
        Sku,
        Name,
        Description,
        Category,
        Price,
        CostPrice,
        WeightGrams,
        ImagePath,
        IsPublished,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
        SupplierId,
        Name,
        ContactName,
        Phone,
        AddressLine1,
        AddressLine2,
        City,
        State,
        PostalCode,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000004_create_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::DropshipperId).uuid().not_null())
                        .col(ColumnDef::new(Orders::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Orders::WarehouseId).uuid().null())
                        .col(ColumnDef::new(Orders::ShippingMethod).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentMode).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::CourierName).string().null())
                        .col(ColumnDef::new(Orders::AwbNumber).string().null())
                        .col(ColumnDef::new(Orders::ShippingCost).decimal().null())
                        .col(ColumnDef::new(Orders::CodAmount).decimal().null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Delivered)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::DeliveredAt).timestamp().null())
                        .col(
                            ColumnDef::new(Orders::Rto)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Orders::RtoDelivered)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::RtoAt).timestamp().null())
                        .col(ColumnDef::new(Orders::LastTrackingStatus).string().null())
                        .col(ColumnDef::new(Orders::ConsigneeName).string().not_null())
                        .col(ColumnDef::new(Orders::ConsigneePhone).string().not_null())
                        .col(
                            ColumnDef::new(Orders::ConsigneeAddress)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::ConsigneeCity).string().not_null())
                        .col(ColumnDef::new(Orders::ConsigneeState).string().not_null())
                        .col(
                            ColumnDef::new(Orders::ConsigneePincode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_dropshipper_id")
                        .table(Orders::Table)
                        .col(Orders::DropshipperId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_supplier_id")
                        .table(Orders::Table)
                        .col(Orders::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Sku).string().not_null())
                        .col(ColumnDef::new(OrderItems::Name).string().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::ProductCost).decimal().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        DropshipperId,
        SupplierId,
        WarehouseId,
        ShippingMethod,
        PaymentMode,
        Status,
        CourierName,
        AwbNumber,
        ShippingCost,
        CodAmount,
        TotalAmount,
        Delivered,
        DeliveredAt,
        Rto,
        RtoDelivered,
        RtoAt,
        LastTrackingStatus,
        ConsigneeName,
        ConsigneePhone,
        ConsigneeAddress,
        ConsigneeCity,
        ConsigneeState,
        ConsigneePincode,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Sku,
        Name,
        Quantity,
        UnitPrice,
        ProductCost,
    }
}

mod m20240115_000005_create_email_configs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000005_create_email_configs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EmailConfigs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EmailConfigs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmailConfigs::Module)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(EmailConfigs::Subject).string().not_null())
                        .col(ColumnDef::new(EmailConfigs::FromName).string().not_null())
                        .col(ColumnDef::new(EmailConfigs::FromEmail).string().not_null())
                        .col(ColumnDef::new(EmailConfigs::BodyHtml).text().not_null())
                        .col(
                            ColumnDef::new(EmailConfigs::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(EmailConfigs::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmailConfigs::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EmailConfigs::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum EmailConfigs {
        Table,
        Id,
        Module,
        Subject,
        FromName,
        FromEmail,
        BodyHtml,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}
