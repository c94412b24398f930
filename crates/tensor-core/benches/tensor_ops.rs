// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for tensor operations.

use criterion::{criterion_group, criterion_main, Criterion};
use tensor_core::{conv3d, conv3d_output_shape, relu, Conv3dParams, Shape, Tensor};

fn bench_conv3d(c: &mut Criterion) {
    // 1-channel 32³ volume through a 3³ kernel with same padding — a
    // scaled-down version of the segmentation workload.
    let input = Tensor::zeros(Shape::activation(1, 1, 32, 32, 32));
    let weight = Tensor::from_f32(Shape::new(vec![4, 1, 3, 3, 3]), &[0.5; 4 * 27]).unwrap();
    let bias = Tensor::from_f32(Shape::vector(4), &[0.1; 4]).unwrap();
    let params = Conv3dParams {
        stride: 1,
        dilation: 1,
        padding: 1,
    };
    let out_shape = conv3d_output_shape(input.shape(), weight.shape(), params).unwrap();

    c.bench_function("conv3d_32cubed_k3", |b| {
        let mut out = Tensor::zeros(out_shape.clone());
        b.iter(|| {
            conv3d(&input.view(), &weight.view(), &bias.view(), params, &mut out).unwrap();
        });
    });
}

fn bench_relu(c: &mut Criterion) {
    let input = Tensor::from_f32(Shape::vector(1 << 20), &vec![-0.5f32; 1 << 20]).unwrap();

    c.bench_function("relu_1m", |b| {
        let mut out = Tensor::zeros(Shape::vector(1 << 20));
        b.iter(|| {
            relu(&input.view(), &mut out).unwrap();
        });
    });
}

criterion_group!(benches, bench_conv3d, bench_relu);
criterion_main!(benches);
