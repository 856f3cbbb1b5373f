//! PHP_CodeSniffer with the Slevomat standard, used as a refactoring advisor
//! rather than a style enforcer.

use super::PackageStep;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::paths;
use crate::reconcile::ToolConfig;

pub const INSTALLER_PLUGIN: &str = "dealerdirect/phpcodesniffer-composer-installer";

pub const DEFAULT_RULESET: &str = r#"<?xml version="1.0"?>
<ruleset xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         name="Code Quality Advisor"
         xsi:noNamespaceSchemaLocation="vendor/squizlabs/php_codesniffer/phpcs.xsd">

    <description>Code quality analysis for refactoring opportunities - not for enforcing style (Pint handles that)</description>

    <!-- Show progress and use colors -->
    <arg value="p"/>
    <arg name="colors"/>

    <!-- Use caching for better performance -->
    <arg name="cache" value=".phpcs.cache"/>

    <!-- Parallel processing for speed -->
    <arg name="parallel" value="8"/>

    <!-- What to scan -->
    <file>app</file>
    <file>config</file>
    <file>routes</file>

    <!-- Excluded paths -->
    <exclude-pattern>*/vendor/*</exclude-pattern>
    <exclude-pattern>*/bootstrap/cache/*</exclude-pattern>
    <exclude-pattern>*/storage/*</exclude-pattern>
    <exclude-pattern>*/node_modules/*</exclude-pattern>
    <exclude-pattern>*/_ide_helper*.php</exclude-pattern>
    <exclude-pattern>*.blade.php</exclude-pattern>
    <exclude-pattern>*/tests/*</exclude-pattern>
    <exclude-pattern>*Test.php</exclude-pattern>
    <exclude-pattern>*/database/migrations/*</exclude-pattern>
    <exclude-pattern>*/database/seeders/*</exclude-pattern>
    <exclude-pattern>*/database/factories/*</exclude-pattern>

    <!-- ==============================================
         CODE COMPLEXITY - Refactoring Opportunities
         ============================================== -->

    <!-- Cognitive Complexity - surfaces complex methods that could be simplified -->
    <rule ref="SlevomatCodingStandard.Complexity.Cognitive">
        <properties>
            <!-- Reasonable threshold for Laravel controllers -->
            <property name="maxComplexity" value="15"/>
        </properties>
    </rule>

    <!-- ==============================================
         TYPE COVERAGE - Find Missing Type Hints
         ============================================== -->

    <!-- Parameter type hints - improves code safety -->
    <rule ref="SlevomatCodingStandard.TypeHints.ParameterTypeHint">
        <properties>
            <property name="enableObjectTypeHint" value="true"/>
            <property name="enableMixedTypeHint" value="true"/>
            <property name="enableUnionTypeHint" value="true"/>
            <property name="enableIntersectionTypeHint" value="true"/>
        </properties>
    </rule>

    <!-- Property type hints - excludes Laravel framework classes -->
    <rule ref="SlevomatCodingStandard.TypeHints.PropertyTypeHint">
        <properties>
            <property name="enableNativeTypeHint" value="true"/>
            <property name="enableMixedTypeHint" value="true"/>
            <property name="enableUnionTypeHint" value="true"/>
            <property name="enableIntersectionTypeHint" value="true"/>
        </properties>
        <!-- Exclude Commands: $signature, $description can't be typed (parent doesn't type them) -->
        <exclude-pattern>*/app/Console/Commands/*</exclude-pattern>
        <!-- Exclude Models: $fillable, $hidden, $casts, etc. can't be typed (parent doesn't type them) -->
        <exclude-pattern>*/app/Models/*</exclude-pattern>
    </rule>

    <!-- Return type hints -->
    <rule ref="SlevomatCodingStandard.TypeHints.ReturnTypeHint">
        <properties>
            <property name="enableObjectTypeHint" value="true"/>
            <property name="enableStaticTypeHint" value="true"/>
            <property name="enableMixedTypeHint" value="true"/>
            <property name="enableUnionTypeHint" value="true"/>
            <property name="enableIntersectionTypeHint" value="true"/>
            <property name="enableNeverTypeHint" value="true"/>
        </properties>
    </rule>

    <!-- ==============================================
         DEAD CODE DETECTION - Cleanup Opportunities
         ============================================== -->

    <!-- Unused variables -->
    <rule ref="SlevomatCodingStandard.Variables.UnusedVariable"/>

    <!-- Unused use statements -->
    <rule ref="SlevomatCodingStandard.Namespaces.UnusedUses">
        <properties>
            <property name="searchAnnotations" value="true"/>
        </properties>
    </rule>

    <!-- Useless variable assignments -->
    <rule ref="SlevomatCodingStandard.Variables.UselessVariable"/>

    <!-- ==============================================
         CODE SMELL DETECTION - Logic Improvements
         ============================================== -->

    <!-- Useless conditions that could be simplified -->
    <rule ref="SlevomatCodingStandard.ControlStructures.UselessIfConditionWithReturn"/>

    <!-- Useless ternary operators -->
    <rule ref="SlevomatCodingStandard.ControlStructures.UselessTernaryOperator"/>

    <!-- Prefer early exit over else (reduces nesting) -->
    <rule ref="SlevomatCodingStandard.ControlStructures.EarlyExit"/>

    <!-- Require null coalesce operator ?? where applicable -->
    <rule ref="SlevomatCodingStandard.ControlStructures.RequireNullCoalesceOperator"/>

    <!-- ==============================================
         MODERN PHP PATTERNS - Upgrade Opportunities
         ============================================== -->

    <!-- Constructor property promotion should be used where possible -->
    <rule ref="SlevomatCodingStandard.Classes.RequireConstructorPropertyPromotion"/>

    <!-- ==============================================
         EXCEPTIONS HANDLING
         ============================================== -->

    <!-- Dead catch - catches exception but doesn't use it -->
    <rule ref="SlevomatCodingStandard.Exceptions.DeadCatch"/>

    <!-- ==============================================
         LARAVEL-SPECIFIC ADJUSTMENTS
         ============================================== -->

    <!-- Allow mixed type hints where needed for Laravel's magic -->
    <rule ref="SlevomatCodingStandard.TypeHints.DisallowMixedTypeHint">
        <severity>0</severity>
    </rule>

    <!-- Allow array type hints for Laravel's flexibility -->
    <rule ref="SlevomatCodingStandard.TypeHints.DisallowArrayTypeHintSyntax">
        <severity>0</severity>
    </rule>

</ruleset>
"#;

fn tool_config(_: &InstallerConfig) -> Result<ToolConfig> {
    Ok(ToolConfig::template(paths::PHPCS_XML, DEFAULT_RULESET))
}

pub fn step() -> PackageStep {
    PackageStep {
        name: "code-sniffer",
        label: "PHP_CodeSniffer",
        detect: &["squizlabs/php_codesniffer", "slevomat/coding-standard"],
        install: &["slevomat/coding-standard", INSTALLER_PLUGIN],
        config: Some(tool_config),
        allow_plugin: Some(INSTALLER_PLUGIN),
        ignore_entry: Some(paths::PHPCS_CACHE),
    }
}
