use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Allergen {
    Table,
    Id,
    Name,
    Category,
    ScientificName,
}

#[derive(Iden, Clone)]
pub enum CrossReactivityGroup {
    Table,
    Id,
    Name,
    ProteinFamily,
}

#[derive(Iden, Clone)]
pub enum AllergenCrossReactivity {
    Table,
    GroupId,
    AllergenId,
}

#[derive(Iden, Clone)]
pub enum Ingredient {
    Table,
    Id,
    Name,
    /// Trimmed lowercase name, used for every name-based lookup.
    NameKey,
    Category,
}

#[derive(Iden, Clone)]
pub enum IngredientAllergen {
    Table,
    IngredientId,
    AllergenId,
    AllergenType,
}

#[derive(Iden, Clone)]
pub enum Recipe {
    Table,
    Id,
    Name,
    CuisineType,
    MealType,
    PrepTime,
    CookTime,
    Difficulty,
    Servings,
    CaloriesPerServing,
}

#[derive(Iden, Clone)]
pub enum RecipeIngredient {
    Table,
    RecipeId,
    Position,
    Name,
    Quantity,
    Unit,
}

#[derive(Iden, Clone)]
pub enum RecipeAllergen {
    Table,
    RecipeId,
    AllergenId,
}

#[derive(Iden, Clone)]
pub enum UserAllergy {
    Table,
    UserId,
    AllergenId,
    Severity,
    Outgrown,
}

#[derive(Iden, Clone)]
pub enum MealPlan {
    Table,
    Id,
    UserId,
    StartDate,
    EndDate,
}

#[derive(Iden, Clone)]
pub enum MealPlanEntry {
    Table,
    MealPlanId,
    MealDate,
    MealType,
    RecipeId,
    ProductId,
    CustomName,
    Servings,
    Completed,
}
