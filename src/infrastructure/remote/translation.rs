//! Field translation between the local record convention (nested groups,
//! camelCase) and the remote row convention (flat, snake_case). The mapping
//! is deterministic and lossless in both directions; embedded collections
//! (meals, sale items) ride along unchanged as JSON columns.

use crate::domain::entities::{
    Course, CourseSchedule, DietPlan, Meal, Member, MemberProfile, Membership, NutritionTargets,
    Product, ProductPricing, Sale, SaleItem, SaleTotals,
};
use crate::domain::value_objects::EntityTable;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberRow {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_plan: String,
    pub membership_started_at: DateTime<Utc>,
    pub membership_expires_at: Option<DateTime<Utc>>,
    pub membership_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberRow {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            full_name: member.profile.full_name,
            email: member.profile.email,
            phone: member.profile.phone,
            membership_plan: member.membership.plan,
            membership_started_at: member.membership.started_at,
            membership_expires_at: member.membership.expires_at,
            membership_active: member.membership.active,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            profile: MemberProfile {
                full_name: row.full_name,
                email: row.email,
                phone: row.phone,
            },
            membership: Membership {
                plan: row.membership_plan,
                started_at: row.membership_started_at,
                expires_at: row.membership_expires_at,
                active: row.membership_active,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub schedule_weekdays: Vec<String>,
    pub schedule_start_time: String,
    pub schedule_duration_minutes: u32,
    pub coach: Option<String>,
    pub capacity: u32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseRow {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            schedule_weekdays: course.schedule.weekdays,
            schedule_start_time: course.schedule.start_time,
            schedule_duration_minutes: course.schedule.duration_minutes,
            coach: course.coach,
            capacity: course.capacity,
            price: course.price,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            schedule: CourseSchedule {
                weekdays: row.schedule_weekdays,
                start_time: row.schedule_start_time,
                duration_minutes: row.schedule_duration_minutes,
            },
            coach: row.coach,
            capacity: row.capacity,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietPlanRow {
    pub id: String,
    pub name: String,
    pub member_id: Option<String>,
    pub meals: Vec<Meal>,
    pub target_daily_calories: u32,
    pub target_protein_grams: u32,
    pub target_carbs_grams: u32,
    pub target_fat_grams: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DietPlan> for DietPlanRow {
    fn from(plan: DietPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            member_id: plan.member_id,
            meals: plan.meals,
            target_daily_calories: plan.targets.daily_calories,
            target_protein_grams: plan.targets.protein_grams,
            target_carbs_grams: plan.targets.carbs_grams,
            target_fat_grams: plan.targets.fat_grams,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

impl From<DietPlanRow> for DietPlan {
    fn from(row: DietPlanRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            member_id: row.member_id,
            meals: row.meals,
            targets: NutritionTargets {
                daily_calories: row.target_daily_calories,
                protein_grams: row.target_protein_grams,
                carbs_grams: row.target_carbs_grams,
                fat_grams: row.target_fat_grams,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub unit_price: f64,
    pub member_discount: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            unit_price: product.pricing.unit_price,
            member_discount: product.pricing.member_discount,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            pricing: ProductPricing {
                unit_price: row.unit_price,
                member_discount: row.member_discount,
            },
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRow {
    pub id: String,
    pub member_id: Option<String>,
    pub items: Vec<SaleItem>,
    pub total_gross: f64,
    pub total_discount: f64,
    pub total_net: f64,
    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Sale> for SaleRow {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            member_id: sale.member_id,
            items: sale.items,
            total_gross: sale.totals.gross,
            total_discount: sale.totals.discount,
            total_net: sale.totals.net,
            sold_at: sale.sold_at,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
        }
    }
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            member_id: row.member_id,
            items: row.items,
            totals: SaleTotals {
                gross: row.total_gross,
                discount: row.total_discount,
                net: row.total_net,
            },
            sold_at: row.sold_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Local-shape record to wire row.
pub fn to_wire(table: EntityTable, record: &Value) -> Result<Value, AppError> {
    match table {
        EntityTable::Members => convert::<Member, MemberRow>(record),
        EntityTable::Courses => convert::<Course, CourseRow>(record),
        EntityTable::DietPlans => convert::<DietPlan, DietPlanRow>(record),
        EntityTable::Products => convert::<Product, ProductRow>(record),
        EntityTable::Sales => convert::<Sale, SaleRow>(record),
    }
}

/// Wire row back to a local-shape record.
pub fn to_local(table: EntityTable, row: &Value) -> Result<Value, AppError> {
    match table {
        EntityTable::Members => convert::<MemberRow, Member>(row),
        EntityTable::Courses => convert::<CourseRow, Course>(row),
        EntityTable::DietPlans => convert::<DietPlanRow, DietPlan>(row),
        EntityTable::Products => convert::<ProductRow, Product>(row),
        EntityTable::Sales => convert::<SaleRow, Sale>(row),
    }
}

fn convert<Src, Dst>(value: &Value) -> Result<Value, AppError>
where
    Src: DeserializeOwned,
    Dst: Serialize + From<Src>,
{
    let source: Src = serde_json::from_value(value.clone())
        .map_err(|err| AppError::DeserializationError(err.to_string()))?;
    serde_json::to_value(Dst::from(source))
        .map_err(|err| AppError::SerializationError(err.to_string()))
}
