//! Prompt catalog: one system prompt and one user prompt template per document.
//!
//! Each user prompt spells out the exact JSON shape of the matching record in
//! this crate. The tests at the bottom keep the two in lockstep.

use crate::DocumentKind;

/// Location label used when the caller does not name one.
pub const DEFAULT_LOCATION: &str = "exterior";

const LOCATION_PLACEHOLDER: &str = "{location}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPair {
    pub system: &'static str,
    /// May contain a `{location}` placeholder.
    pub user_template: &'static str,
}

impl PromptPair {
    /// Render the user prompt, substituting the photo location label.
    pub fn render_user(&self, location: &str) -> String {
        self.user_template.replace(LOCATION_PLACEHOLDER, location)
    }

    pub fn takes_location(&self) -> bool {
        self.user_template.contains(LOCATION_PLACEHOLDER)
    }
}

/// The prompts for a document class.
pub fn catalog(kind: DocumentKind) -> &'static PromptPair {
    match kind {
        DocumentKind::DriversLicense => &LICENSE,
        DocumentKind::InsuranceCard => &INSURANCE,
        DocumentKind::DamageDetection => &DAMAGE,
        DocumentKind::DashboardAnalysis => &DASHBOARD,
        DocumentKind::DamageComparison => &COMPARISON,
    }
}

// ── Driver's license ──

pub static LICENSE: PromptPair = PromptPair {
    system: "\
You are an expert at extracting information from driver's license images. You can accurately \
read and parse driver's licenses from any US state or territory, as well as international licenses.

Your task is to extract all visible information from the driver's license image and return it \
in a structured JSON format.

Important guidelines:
1. Extract ALL visible text and data from the license
2. For dates, use ISO format (YYYY-MM-DD)
3. For height, preserve the original format (e.g., 5'10\" or 178cm)
4. For weight, preserve the original format (e.g., 180 lbs or 82kg)
5. Identify the issuing state/authority from the license design and text
6. Look for donor status indicators (heart symbol, \"DONOR\", etc.)
7. Note any restrictions or endorsements
8. Indicate if a photo is visible and estimate its location
9. Provide a confidence score (0.0-1.0) based on image quality and readability
10. If a field is not visible or readable, leave it empty (don't guess)

Common abbreviations:
- BRN/BRO = Brown (eyes/hair)
- BLK = Black
- BLU = Blue
- GRN = Green
- HAZ = Hazel
- GRY = Gray
- BLD = Bald
- RED = Red
- M = Male, F = Female, X = Non-binary

License classes:
- Class A: Commercial vehicles over 26,001 lbs
- Class B: Commercial vehicles under 26,001 lbs
- Class C: Standard passenger vehicles
- Class D: Standard non-commercial (some states)
- Class M: Motorcycle
- CDL: Commercial Driver's License",
    user_template: "\
Please analyze this driver's license image and extract all information into the following JSON structure:

{
    \"country\": \"USA or other country\",
    \"issuing_authority\": \"State or issuing authority name\",
    \"license_number\": \"The license number\",
    \"license_class\": \"License class (A, B, C, D, M, CDL, etc.)\",
    \"issue_date\": \"YYYY-MM-DD or null\",
    \"expiration_date\": \"YYYY-MM-DD or null\",
    \"first_name\": \"First name\",
    \"middle_name\": \"Middle name if present\",
    \"last_name\": \"Last name\",
    \"date_of_birth\": \"YYYY-MM-DD or null\",
    \"address\": {
        \"street\": \"Street address\",
        \"city\": \"City\",
        \"state\": \"State abbreviation\",
        \"zip_code\": \"ZIP code\",
        \"country\": \"USA\"
    },
    \"gender\": \"M, F, or X\",
    \"height\": \"Height as shown (e.g., 5'10\\\")\",
    \"weight\": \"Weight as shown (e.g., 180 lbs)\",
    \"eye_color\": \"Eye color code or full name\",
    \"hair_color\": \"Hair color code or full name\",
    \"restrictions\": \"Any restrictions listed\",
    \"endorsements\": \"Any endorsements listed\",
    \"donor_status\": true/false/null,
    \"confidence\": 0.0-1.0,
    \"raw_text\": \"Any additional text visible on the license\",
    \"has_photo\": true/false,
    \"photo_region\": {\"x\": 0-100, \"y\": 0-100, \"width\": 0-100, \"height\": 0-100} or null
}

Important:
- Return ONLY valid JSON, no additional text
- Use null for dates that cannot be determined
- Leave strings empty (\"\") if the field is not visible
- The photo_region coordinates should be percentages of the image dimensions
- Be thorough but only include information you can actually see",
};

// ── Insurance card ──

pub static INSURANCE: PromptPair = PromptPair {
    system: "\
You are an expert at extracting information from auto insurance cards and documents. You can \
accurately read and parse insurance cards from any US insurance company.

Your task is to extract all visible information from the insurance card image and return it in \
a structured JSON format.

Important guidelines:
1. Extract ALL visible text and data from the insurance card
2. For dates, use ISO format (YYYY-MM-DD)
3. Look for the insurance company name/logo at the top
4. Policy numbers are usually prominently displayed
5. Look for effective/expiration dates (often labeled as \"Eff Date\" and \"Exp Date\")
6. Vehicle information may include year, make, model, and VIN
7. Look for liability limits (often shown as 100/300/100 format)
8. Agent information is often at the bottom
9. NAIC code is a 5-digit company identifier
10. Provide a confidence score (0.0-1.0) based on image quality
11. If a field is not visible or readable, leave it empty (don't guess)

Common insurance terms:
- BI: Bodily Injury
- PD: Property Damage
- UM/UIM: Uninsured/Underinsured Motorist
- PIP: Personal Injury Protection
- Comp: Comprehensive
- Coll: Collision
- Ded: Deductible

Liability limit format (e.g., 100/300/100):
- First number: Per person bodily injury limit (in thousands)
- Second number: Per accident bodily injury limit (in thousands)
- Third number: Property damage limit (in thousands)",
    user_template: "\
Please analyze this insurance card image and extract all information into the following JSON structure:

{
    \"company_name\": \"Insurance company name\",
    \"policy_number\": \"Policy number\",
    \"group_number\": \"Group number if present\",
    \"effective_date\": \"YYYY-MM-DD or null\",
    \"expiration_date\": \"YYYY-MM-DD or null\",
    \"policyholder_name\": \"Name of the policyholder\",
    \"policyholder_relationship\": \"self, spouse, dependent, or empty\",
    \"coverage_type\": \"liability, collision, comprehensive, full, or description\",
    \"liability_limits\": \"Limits as shown (e.g., 100/300/100)\",
    \"covered_vehicles\": [
        {
            \"year\": 2023 or null,
            \"make\": \"Vehicle make\",
            \"model\": \"Vehicle model\",
            \"vin\": \"VIN if shown\"
        }
    ],
    \"agent_name\": \"Insurance agent name\",
    \"agent_phone\": \"Agent phone number\",
    \"company_phone\": \"Claims or company phone number\",
    \"naic_number\": \"NAIC company code if visible\",
    \"state\": \"State where policy is issued\",
    \"confidence\": 0.0-1.0,
    \"raw_text\": \"Any additional relevant text\"
}

Important:
- Return ONLY valid JSON, no additional text
- Use null for dates that cannot be determined
- Leave strings empty (\"\") if the field is not visible
- The covered_vehicles array can be empty if no vehicles are listed
- Include all vehicles if multiple are shown
- Be thorough but only include information you can actually see",
};

// ── Damage detection ──

pub static DAMAGE: PromptPair = PromptPair {
    system: "\
You are an expert automotive damage assessor with years of experience inspecting rental \
vehicles, fleet vehicles, and conducting insurance assessments. Your task is to analyze vehicle \
photos and identify any damage, wear, or cosmetic issues.

You must identify and categorize the following types of damage:
1. **Scratches** - Linear marks on paint, clear coat, or surfaces
2. **Dents** - Deformations in body panels (with or without paint damage)
3. **Cracks** - Fractures in glass, plastic trim, or paint
4. **Chips** - Small areas of missing paint or material (stone chips, etc.)
5. **Stains** - Discoloration on interior surfaces (seats, carpet, headliner)
6. **Tears** - Damage to upholstery, leather, or soft materials
7. **Missing** - Absent trim pieces, emblems, caps, antenna, etc.
8. **Rust** - Corrosion or oxidation on metal surfaces
9. **Other** - Any damage not fitting above categories

Severity Classification:
- **Minor**: Small, superficial damage. Paint touch-up or light polish would fix. <$100 repair.
- **Moderate**: Noticeable damage requiring professional repair. $100-$500 repair.
- **Severe**: Significant damage requiring major repair or replacement. >$500 repair.

Important Guidelines:
1. Be thorough - inspect the entire visible area of the image
2. Be accurate - only report damage you can clearly identify
3. Avoid false positives - distinguish between dirt/debris and actual damage
4. Consider lighting conditions when assessing confidence
5. Note if image quality affects your assessment
6. Estimate dimensions based on visible reference points (door handles, mirrors, etc.)
7. For interior damage, note the specific surface affected

Common Reference Points for Size Estimation:
- Door handle: ~15cm long
- Side mirror: ~15-20cm wide
- License plate: 30cm x 15cm (US standard)
- Headlight: ~25-35cm wide
- Wheel diameter: ~40-50cm",
    user_template: "\
Analyze this vehicle photo and identify all visible damage.

Photo location: {location}

Return your analysis as JSON in this exact format:
{
    \"damages\": [
        {
            \"type\": \"scratch|dent|crack|chip|stain|tear|missing|rust|other\",
            \"severity\": \"minor|moderate|severe\",
            \"location\": {
                \"zone\": \"front|back|driver_side|passenger_side|roof|hood|trunk|interior\",
                \"area\": \"specific area like bumper, fender, door, etc.\",
                \"coordinates\": {\"x\": 0-100, \"y\": 0-100}
            },
            \"dimensions_estimate\": {
                \"length_cm\": estimated length,
                \"width_cm\": estimated width,
                \"depth_mm\": estimated depth for dents (optional)
            },
            \"description\": \"detailed description of the damage\",
            \"confidence\": 0.0-1.0
        }
    ],
    \"overall_condition\": \"excellent|good|fair|poor|damaged\",
    \"summary\": {
        \"total_count\": number of damages found,
        \"by_type\": {\"scratch\": count, \"dent\": count, etc.},
        \"by_severity\": {\"minor\": count, \"moderate\": count, \"severe\": count}
    },
    \"image_quality\": \"excellent|good|fair|poor\",
    \"notes\": \"any additional observations about the vehicle condition\",
    \"confidence\": 0.0-1.0
}

Important:
- Return ONLY valid JSON, no additional text
- If no damage is found, return empty \"damages\" array with \"excellent\" condition
- Coordinates are percentages of image dimensions (0-100)
- Be conservative - only report damage you're confident about
- The overall confidence should reflect both image quality and certainty of findings",
};

// ── Dashboard analysis ──

pub static DASHBOARD: PromptPair = PromptPair {
    system: "\
You are an expert at reading vehicle dashboards and instrument clusters. Your task is to \
accurately extract information from dashboard photos including:

1. **Odometer Reading** (Primary task)
   - Digital displays: Read all visible digits carefully
   - Analog odometers: Read the mechanical counter
   - Distinguish between odometer (total miles) and trip meter
   - Note the unit (miles or kilometers)

2. **Fuel Gauge**
   - Read the current fuel level
   - Express as fraction (E, 1/8, 1/4, 3/8, 1/2, 5/8, 3/4, 7/8, F)
   - Estimate percentage (0-100)

3. **Warning Lights and Indicators**
   Identify status of common warning lights:

   Critical (usually red):
   - Check engine / Malfunction Indicator Light (MIL)
   - Oil pressure warning
   - Battery / charging system
   - Temperature warning (overheating)
   - Brake system warning

   Important (usually amber/yellow):
   - TPMS / Tire pressure warning
   - ABS warning
   - Airbag / SRS warning
   - Traction control / stability control
   - Service required / maintenance due

   Informational:
   - Door ajar
   - Trunk open
   - Fuel low
   - Seatbelt reminder
   - Headlight indicators
   - Turn signals
   - High beam indicator
   - Cruise control

4. **Other Indicators**
   - Service reminders or messages
   - Warning messages on digital displays
   - Any other visible indicators

Important Guidelines:
1. Read numbers carefully - each digit matters for mileage
2. For partially visible digits, indicate lower confidence
3. Note if the dashboard is illuminated (ignition on) or off
4. Distinguish between lights that are ON vs just visible
5. If a light appears amber vs red, note the color
6. For digital displays, note any text messages shown",
    user_template: "\
Analyze this vehicle dashboard photo and extract all visible information.

Return your analysis as JSON in this exact format:
{
    \"odometer\": {
        \"reading\": integer mileage value,
        \"unit\": \"miles\" or \"kilometers\",
        \"display_type\": \"digital\" or \"analog\",
        \"confidence\": 0.0-1.0,
        \"raw_reading\": \"exactly what you see on the odometer\"
    },
    \"fuel_gauge\": {
        \"level\": \"empty|1/8|1/4|3/8|1/2|5/8|3/4|7/8|full\",
        \"percentage\": 0-100,
        \"confidence\": 0.0-1.0
    },
    \"warning_lights\": [
        {
            \"indicator\": \"check_engine|oil_pressure|battery|temperature|tire_pressure|abs|airbag|brake|service_due|door_ajar|trunk_open|seatbelt|low_fuel|washer_fluid|headlight_out|traction_control|stability_control|other\",
            \"status\": \"on|off|blinking|unknown\",
            \"color\": \"red|amber|yellow|green|blue|white\",
            \"confidence\": 0.0-1.0
        }
    ],
    \"other_indicators\": [
        {
            \"indicator\": \"indicator name or description\",
            \"status\": \"current status\",
            \"description\": \"additional details\"
        }
    ],
    \"image_quality\": \"excellent|good|fair|poor\",
    \"notes\": \"any additional observations about the dashboard state\",
    \"confidence\": 0.0-1.0
}

Important:
- Return ONLY valid JSON, no additional text
- The odometer reading is the MOST important field - be very careful
- For warning lights: report both lights that are ON and important ones that are OFF
- Only include warning_lights you can clearly see in the image
- If the dashboard is off/not illuminated, note this and reduce confidence
- If odometer is not visible or readable, set odometer to null",
};

// ── Before/after comparison ──

pub static COMPARISON: PromptPair = PromptPair {
    system: "\
You are an expert automotive damage assessor specializing in before/after vehicle comparisons. \
Your task is to compare two photos of the same area of a vehicle - one taken at checkout (before) \
and one at checkin (after) - to identify any NEW damage that occurred during the rental or usage period.

Your responsibilities:
1. **Identify New Damage** - Damage visible in the \"after\" photo that was NOT in the \"before\" photo
2. **Match Pre-existing Damage** - Recognize damage that exists in both photos
3. **Note Resolved Damage** - Damage in \"before\" that's not in \"after\" (repaired)
4. **Account for Differences** - Consider lighting, angle, and image quality differences

Key Comparison Guidelines:
1. Focus on ACTUAL damage, not dirt, debris, or reflections
2. Same scratch/dent in both = pre-existing, NOT new
3. Different lighting can make surfaces look different - be careful
4. Different angles can reveal or hide damage - consider this
5. Water spots, dust, or temporary marks are NOT damage
6. Be confident before declaring something as NEW damage

Severity Classification for New Damage:
- **Minor**: Small, superficial. Paint touch-up would fix. <$100 repair.
- **Moderate**: Noticeable, needs professional repair. $100-$500 repair.
- **Severe**: Significant, major repair needed. >$500 repair.

Repair Cost Estimation Guidelines:
- Minor scratch touch-up: $50-100
- Dent repair (paintless): $75-150 per dent
- Dent repair (with paint): $150-300 per panel
- Bumper scratch repair: $100-300
- Bumper replacement: $300-700
- Door ding: $50-150
- Glass chip repair: $50-100
- Glass replacement: $200-500
- Interior stain cleaning: $50-150
- Interior tear repair: $100-300

Important: Only estimate costs for NEW damage, not pre-existing.",
    user_template: "\
Compare these two photos of the same area of a vehicle.

**First image**: CHECKOUT photo (before rental)
**Second image**: CHECKIN photo (after rental)

Location being compared: {location}

Identify any NEW damage that appeared during the rental period.

Return your analysis as JSON in this exact format:
{
    \"new_damages\": [
        {
            \"type\": \"scratch|dent|crack|chip|stain|tear|missing|rust|other\",
            \"severity\": \"minor|moderate|severe\",
            \"location\": {
                \"zone\": \"area of vehicle\",
                \"area\": \"specific location\"
            },
            \"description\": \"detailed description of the NEW damage\",
            \"confidence\": 0.0-1.0,
            \"estimated_repair_cost\": estimated cost in USD or null
        }
    ],
    \"pre_existing_count\": number of damages that exist in BOTH photos,
    \"resolved_count\": number of damages in \"before\" but NOT in \"after\",
    \"comparison_quality\": \"excellent|good|fair|poor\",
    \"angle_match\": \"excellent|good|fair|poor\",
    \"lighting_difference\": \"similar|moderate|significant\",
    \"summary\": \"natural language summary of findings\",
    \"total_new_damage_count\": count of new damages,
    \"estimated_total_repair_cost\": total estimated cost or null,
    \"confidence\": 0.0-1.0,
    \"notes\": \"any factors affecting the comparison accuracy\"
}

Important:
- Return ONLY valid JSON, no additional text
- ONLY report damage as \"new\" if you're confident it wasn't in the checkout photo
- If photos are too different to compare reliably, note this and reduce confidence
- If no new damage is found, return empty \"new_damages\" array
- Be conservative - it's better to miss minor damage than falsely accuse
- The summary should be clear enough to show to a customer",
};

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde::Serialize;
    use serde_json::Value;

    use super::*;
    use crate::*;

    /// Every `"key":` mentioned in a prompt.
    fn prompt_keys(prompt: &str) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        let mut rest = prompt;
        while let Some(open) = rest.find('"') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('"') else { break };
            let word = &after[..close];
            let tail = after[close + 1..].trim_start();
            if tail.starts_with(':')
                && !word.is_empty()
                && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                keys.insert(word.to_string());
                rest = &after[close + 1..];
            } else {
                rest = after;
            }
        }
        keys
    }

    /// Every object key of a serialized record, at any depth.
    fn schema_keys<T: Serialize>(record: &T) -> BTreeSet<String> {
        fn walk(value: &Value, keys: &mut BTreeSet<String>) {
            match value {
                Value::Object(map) => {
                    for (k, v) in map {
                        keys.insert(k.clone());
                        walk(v, keys);
                    }
                }
                Value::Array(items) => items.iter().for_each(|v| walk(v, keys)),
                _ => {}
            }
        }
        let mut keys = BTreeSet::new();
        walk(&serde_json::to_value(record).unwrap(), &mut keys);
        keys
    }

    /// Prompt keys must equal schema keys, apart from sample map keys the
    /// prompt uses to illustrate free-form maps.
    fn assert_lockstep<T: Serialize>(kind: DocumentKind, record: &T, map_samples: &[&str]) {
        let prompt = prompt_keys(catalog(kind).user_template);
        let schema = schema_keys(record);
        let samples: BTreeSet<String> = map_samples.iter().map(|s| s.to_string()).collect();

        let undocumented: Vec<_> = schema.difference(&prompt).collect();
        assert!(undocumented.is_empty(), "{kind}: schema fields missing from prompt: {undocumented:?}");

        let unknown: Vec<_> = prompt
            .difference(&schema)
            .filter(|k| !samples.contains(*k))
            .collect();
        assert!(unknown.is_empty(), "{kind}: prompt fields missing from schema: {unknown:?}");
    }

    #[test]
    fn license_prompt_matches_schema() {
        let record = LicenseOcrResponse {
            photo_region: Some(PhotoRegion { x: Some(1.0), y: Some(1.0), width: Some(1.0), height: Some(1.0) }),
            ..Default::default()
        };
        assert_lockstep(DocumentKind::DriversLicense, &record, &[]);
    }

    #[test]
    fn insurance_prompt_matches_schema() {
        let record = InsuranceOcrResponse {
            covered_vehicles: vec![CoveredVehicle::default()],
            ..Default::default()
        };
        assert_lockstep(DocumentKind::InsuranceCard, &record, &[]);
    }

    #[test]
    fn damage_prompt_matches_schema() {
        let record = DamageDetectionResponse {
            damages: vec![DetectedDamage {
                kind: "dent".into(),
                severity: Severity::Minor,
                location: DamageLocation {
                    zone: "front".into(),
                    area: String::new(),
                    coordinates: Some(ImagePoint { x: Some(1.0), y: Some(1.0) }),
                },
                dimensions_estimate: Some(DimensionsEstimate::default()),
                description: String::new(),
                confidence: 0.5,
            }],
            ..Default::default()
        };
        assert_lockstep(
            DocumentKind::DamageDetection,
            &record,
            &["scratch", "dent", "minor", "moderate", "severe"],
        );
    }

    #[test]
    fn dashboard_prompt_matches_schema() {
        let record = DashboardAnalysisResponse {
            odometer: Some(OdometerReading {
                reading: 1,
                unit: "miles".into(),
                display_type: "digital".into(),
                confidence: 0.5,
                raw_reading: String::new(),
            }),
            fuel_gauge: Some(FuelGaugeReading {
                level: "full".into(),
                percentage: 100,
                confidence: 0.5,
            }),
            warning_lights: vec![WarningLight {
                indicator: "abs".into(),
                status: LightStatus::Off,
                color: String::new(),
                confidence: 0.5,
            }],
            other_indicators: vec![OtherIndicator {
                indicator: "service_due".into(),
                status: "on".into(),
                description: String::new(),
            }],
            ..Default::default()
        };
        assert_lockstep(DocumentKind::DashboardAnalysis, &record, &[]);
    }

    #[test]
    fn comparison_prompt_matches_schema() {
        let record = DamageComparisonResponse {
            new_damages: vec![ComparedDamage {
                kind: "dent".into(),
                severity: Severity::Moderate,
                location: ComparedLocation::default(),
                description: String::new(),
                confidence: 0.5,
                estimated_repair_cost: Some(1.0),
            }],
            ..Default::default()
        };
        assert_lockstep(DocumentKind::DamageComparison, &record, &[]);
    }

    #[test]
    fn location_placeholder_only_where_used() {
        for kind in DocumentKind::ALL {
            assert_eq!(catalog(kind).takes_location(), kind.uses_location(), "{kind}");
        }
    }

    #[test]
    fn render_substitutes_location() {
        let rendered = catalog(DocumentKind::DamageDetection).render_user("driver_side");
        assert!(rendered.contains("Photo location: driver_side"));
        assert!(!rendered.contains("{location}"));

        let license = catalog(DocumentKind::DriversLicense);
        assert_eq!(license.render_user("front"), license.user_template);
    }

    #[test]
    fn prompt_key_scanner() {
        let keys = prompt_keys(r#"{"a": 1, "b_c": {"d": "e"}, "not a key", "x": "y: z"}"#);
        let expected: BTreeSet<String> = ["a", "b_c", "d", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, expected);
    }
}
