use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Facility::Table)
                    .if_not_exists()
                    .col(pk_auto(Facility::Id))
                    .col(integer(Facility::Position).not_null().unique_key())
                    .col(string_len(Facility::Name, 100).not_null())
                    .col(double(Facility::Lat).not_null())
                    .col(double(Facility::Lng).not_null())
                    .to_owned(),
            )
            .await?;

        // Seed hospitals
        let mut insert = Query::insert();
        insert.into_table(Facility::Table).columns([
            Facility::Position,
            Facility::Name,
            Facility::Lat,
            Facility::Lng,
        ]);
        for (position, (name, lat, lng)) in HOSPITALS.iter().enumerate() {
            insert.values_panic([
                (position as i32).into(),
                (*name).into(),
                (*lat).into(),
                (*lng).into(),
            ]);
        }

        manager.exec_stmt(insert.to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Facility::Table).to_owned())
            .await
    }
}

/// Hospitals around Haldwani, plus one in Delhi, in display order.
pub const HOSPITALS: &[(&str, f64, f64)] = &[
    ("Susheela Tiwari Government Hospital", 29.2075, 79.5080),
    ("Krishna Hospital and Research Centre", 29.2225, 79.5167),
    ("Vivekanand Hospital", 29.2296, 79.5053),
    ("Brij Lal Hospital", 29.2284, 79.4986),
    ("Neelkanth Hospital", 29.2136, 79.5068),
    ("Central Hospital", 29.2131, 79.5092),
    ("Bombay Hospital and Research Centre", 29.2122, 79.5059),
    ("Aims Hospita", 28.5850, 77.2080),
    ("Sai Hospital", 29.2267, 79.5083),
    ("Tewari Maternity Center and Nursing Home", 29.2275, 79.5032),
    ("Agarwal Clinic and Nursing Home", 29.2189, 79.5011),
    ("Eye Q Super Speciality Eye Hospital", 29.2187, 79.5142),
    ("Sanjiwani Hospital", 29.2244, 79.5051),
    ("Saraswati Hospital", 29.2226, 79.5100),
    ("Ram Hospital", 29.2279, 79.5097),
    ("Mittal Nursing Home", 29.2210, 79.5078),
    ("Mattrix Hospital", 29.2255, 79.5065),
    ("Shriram Hospital", 29.2281, 79.5014),
    ("Dr. Pooja Hospital", 29.2248, 79.5029),
    ("Jeevan Jyoti Hospital", 29.2291, 79.5089),
    ("Himalayan Eye Hospital", 29.2266, 79.5071),
    ("Vinayak Hospital", 29.2214, 79.5042),
    ("Mahesh Hospital", 29.2233, 79.5069),
    ("Arun Hospital", 29.2287, 79.5056),
    ("Bhatt Hospital", 29.2209, 79.5103),
];

#[derive(DeriveIden)]
pub enum Facility {
    Table,
    Id,
    Position,
    Name,
    Lat,
    Lng,
}
