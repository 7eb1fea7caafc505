use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum StaffUsers {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Trainers {
    Table,
    Id,
    FirstName,
    LastName,
    Phone,
    Specialization,
    Fee,
}

#[derive(DeriveIden)]
enum MembershipPlans {
    Table,
    Id,
    Name,
    Kind,
    Price,
    DurationDays,
    VisitCount,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    FirstName,
    LastName,
    BirthDate,
    Gender,
    Phone,
    Email,
    Organization,
    CardNumber,
    PhotoPath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClientMemberships {
    Table,
    Id,
    ClientId,
    PlanId,
    StartDate,
    EndDate,
    RemainingVisits,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ClientId,
    PlanId,
    TrainerId,
    FixedStart,
    FixedEnd,
    MembershipAmount,
    TrainerFee,
    Amount,
    Method,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CheckIns {
    Table,
    Id,
    ClientId,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffUsers::Table)
                    .if_not_exists()
                    .col(&mut id_col(StaffUsers::Id))
                    .col(
                        ColumnDef::new(StaffUsers::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffUsers::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(&mut created_at_col(StaffUsers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trainers::Table)
                    .if_not_exists()
                    .col(&mut id_col(Trainers::Id))
                    .col(ColumnDef::new(Trainers::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Trainers::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Trainers::Phone).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Trainers::Specialization)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Trainers::Fee)
                            .decimal_len(8, 2)
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipPlans::Table)
                    .if_not_exists()
                    .col(&mut id_col(MembershipPlans::Id))
                    .col(
                        ColumnDef::new(MembershipPlans::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MembershipPlans::Kind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MembershipPlans::Price)
                            .decimal_len(8, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MembershipPlans::DurationDays).integer().null())
                    .col(ColumnDef::new(MembershipPlans::VisitCount).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(&mut id_col(Clients::Id))
                    .col(ColumnDef::new(Clients::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Clients::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Clients::BirthDate).date().null())
                    .col(ColumnDef::new(Clients::Gender).string_len(10).null())
                    .col(ColumnDef::new(Clients::Phone).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Clients::Email)
                            .string_len(254)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Clients::Organization)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    // NULL when blank so that several clients may go without a card
                    .col(
                        ColumnDef::new(Clients::CardNumber)
                            .string_len(50)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Clients::PhotoPath).string_len(255).null())
                    .col(&mut created_at_col(Clients::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientMemberships::Table)
                    .if_not_exists()
                    .col(&mut id_col(ClientMemberships::Id))
                    .col(
                        ColumnDef::new(ClientMemberships::ClientId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientMemberships::PlanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientMemberships::StartDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClientMemberships::EndDate).date().null())
                    .col(
                        ColumnDef::new(ClientMemberships::RemainingVisits)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ClientMemberships::Status)
                            .string_len(10)
                            .not_null()
                            .default("active"),
                    )
                    .col(&mut created_at_col(ClientMemberships::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_memberships_client")
                            .from(ClientMemberships::Table, ClientMemberships::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_memberships_plan")
                            .from(ClientMemberships::Table, ClientMemberships::PlanId)
                            .to(MembershipPlans::Table, MembershipPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_client_memberships_client_status")
                    .table(ClientMemberships::Table)
                    .col(ClientMemberships::ClientId)
                    .col(ClientMemberships::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_client_memberships_end_date")
                    .table(ClientMemberships::Table)
                    .col(ClientMemberships::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(&mut id_col(Payments::Id))
                    .col(ColumnDef::new(Payments::ClientId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PlanId).big_integer().null())
                    .col(ColumnDef::new(Payments::TrainerId).big_integer().null())
                    .col(ColumnDef::new(Payments::FixedStart).date().null())
                    .col(ColumnDef::new(Payments::FixedEnd).date().null())
                    .col(
                        ColumnDef::new(Payments::MembershipAmount)
                            .decimal_len(8, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Payments::TrainerFee)
                            .decimal_len(8, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Payments::Amount).decimal_len(8, 2).not_null())
                    .col(ColumnDef::new(Payments::Method).string_len(20).not_null())
                    .col(&mut created_at_col(Payments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_client")
                            .from(Payments::Table, Payments::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_plan")
                            .from(Payments::Table, Payments::PlanId)
                            .to(MembershipPlans::Table, MembershipPlans::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_trainer")
                            .from(Payments::Table, Payments::TrainerId)
                            .to(Trainers::Table, Trainers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_created_at")
                    .table(Payments::Table)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CheckIns::Table)
                    .if_not_exists()
                    .col(&mut id_col(CheckIns::Id))
                    .col(ColumnDef::new(CheckIns::ClientId).big_integer().not_null())
                    .col(&mut created_at_col(CheckIns::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_check_ins_client")
                            .from(CheckIns::Table, CheckIns::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_check_ins_created_at")
                    .table(CheckIns::Table)
                    .col(CheckIns::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(CheckIns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ClientMemberships::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MembershipPlans::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Trainers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(StaffUsers::Table).to_owned())
            .await?;
        Ok(())
    }
}
