//! Seed command handler

use crate::config::Config;
use crate::db::Store;
use crate::models::settings::SiteSettings;
use crate::models::testimonial::TestimonialInput;
use crate::models::vehicle::{
    FuelType, Transmission, VehicleInput, VehicleQuery, VehicleStatus,
};
use crate::services::{
    SeaOrmSettingsService, SeaOrmTestimonialService, SeaOrmVehicleService, SettingsService,
    TestimonialService, VehicleService,
};

struct DemoVehicle {
    make: &'static str,
    model: &'static str,
    year: i32,
    mileage: i32,
    price: i64,
    fuel: FuelType,
    transmission: Transmission,
    body_type: &'static str,
    colour: &'static str,
    featured_position: Option<i32>,
    status: VehicleStatus,
}

const DEMO_VEHICLES: &[DemoVehicle] = &[
    DemoVehicle {
        make: "Volkswagen",
        model: "Golf 1.5 TSI Life",
        year: 2021,
        mileage: 24_500,
        price: 17_995,
        fuel: FuelType::Petrol,
        transmission: Transmission::Manual,
        body_type: "Hatchback",
        colour: "Moonstone Grey",
        featured_position: Some(1),
        status: VehicleStatus::Available,
    },
    DemoVehicle {
        make: "Toyota",
        model: "RAV4 2.5 Hybrid Design",
        year: 2022,
        mileage: 18_200,
        price: 29_450,
        fuel: FuelType::Hybrid,
        transmission: Transmission::Automatic,
        body_type: "SUV",
        colour: "Pearl White",
        featured_position: Some(2),
        status: VehicleStatus::Available,
    },
    DemoVehicle {
        make: "BMW",
        model: "320d M Sport Touring",
        year: 2020,
        mileage: 41_000,
        price: 21_750,
        fuel: FuelType::Diesel,
        transmission: Transmission::Automatic,
        body_type: "Estate",
        colour: "Black Sapphire",
        featured_position: None,
        status: VehicleStatus::Reserved,
    },
    DemoVehicle {
        make: "Kia",
        model: "EV6 GT-Line",
        year: 2023,
        mileage: 9_800,
        price: 34_995,
        fuel: FuelType::Electric,
        transmission: Transmission::Automatic,
        body_type: "Crossover",
        colour: "Runway Red",
        featured_position: Some(3),
        status: VehicleStatus::Available,
    },
    DemoVehicle {
        make: "Ford",
        model: "Fiesta 1.0 EcoBoost Titanium",
        year: 2019,
        mileage: 37_600,
        price: 10_495,
        fuel: FuelType::Petrol,
        transmission: Transmission::Manual,
        body_type: "Hatchback",
        colour: "Frozen White",
        featured_position: None,
        status: VehicleStatus::Sold,
    },
    DemoVehicle {
        make: "Volvo",
        model: "XC60 T8 Recharge Inscription",
        year: 2021,
        mileage: 30_100,
        price: 36_500,
        fuel: FuelType::PlugInHybrid,
        transmission: Transmission::Automatic,
        body_type: "SUV",
        colour: "Denim Blue",
        featured_position: None,
        status: VehicleStatus::Draft,
    },
];

const DEMO_TESTIMONIALS: &[(&str, &str, i32, &str, bool)] = &[
    (
        "Priya S.",
        "Bought a RAV4",
        5,
        "They found exactly the car we wanted within a week and handled everything.",
        true,
    ),
    (
        "Tom W.",
        "First-time buyer",
        5,
        "No pressure, honest advice and the car was spotless on delivery.",
        false,
    ),
    (
        "Helen and Mark",
        "Family estate",
        4,
        "Great communication throughout. Would use again for our next car.",
        false,
    ),
];

pub async fn cmd_seed(config: &Config, force: bool) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    let vehicles = SeaOrmVehicleService::new(store.clone());
    let testimonials = SeaOrmTestimonialService::new(store.clone());
    let settings = SeaOrmSettingsService::new(store);

    let existing = vehicles
        .list_admin(VehicleQuery::default())
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .total;
    if existing > 0 && !force {
        println!("Database already has {existing} vehicles; pass --force to seed anyway.");
        return Ok(());
    }

    for demo in DEMO_VEHICLES {
        let input = VehicleInput {
            make: demo.make.to_string(),
            model: demo.model.to_string(),
            year: demo.year,
            mileage: demo.mileage,
            price: demo.price,
            fuel: demo.fuel,
            transmission: demo.transmission,
            body_type: Some(demo.body_type.to_string()),
            colour: Some(demo.colour.to_string()),
            description: Some(format!(
                "{} {} in {}. Full service history, two keys, inspected before handover.",
                demo.make, demo.model, demo.colour
            )),
            images: Vec::new(),
            featured: demo.featured_position.is_some(),
            featured_position: demo.featured_position,
            status: demo.status,
        };
        let vehicle = vehicles
            .create(input)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed {} {}: {e}", demo.make, demo.model))?;
        println!("✓ Vehicle #{} {}", vehicle.id, vehicle.title());
    }

    for (name, role, rating, content, featured) in DEMO_TESTIMONIALS {
        let input = TestimonialInput {
            name: (*name).to_string(),
            role: Some((*role).to_string()),
            rating: *rating,
            content: (*content).to_string(),
            featured: *featured,
            active: true,
            sort_order: None,
        };
        let testimonial = testimonials
            .create(input)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed testimonial: {e}"))?;
        println!("✓ Testimonial #{} from {}", testimonial.id, testimonial.name);
    }

    settings
        .update(SiteSettings::default())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed settings: {e}"))?;
    println!("✓ Site settings reset to defaults");

    Ok(())
}
